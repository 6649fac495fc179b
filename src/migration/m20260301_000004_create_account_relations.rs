//! Migration: Create account relation tables.
//!
//! - account_organizations: organization membership
//! - account_repositories: followed (personal) repositories
//! - account_managed_repositories: repositories the account administrates

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE account_organizations (
                    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                    organization_id BIGINT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    PRIMARY KEY (account_id, organization_id)
                );

                CREATE TABLE account_repositories (
                    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                    repository_id BIGINT NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    PRIMARY KEY (account_id, repository_id)
                );

                CREATE TABLE account_managed_repositories (
                    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                    repository_id BIGINT NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    PRIMARY KEY (account_id, repository_id)
                );

                -- Reverse lookups (who manages / follows a repository)
                CREATE INDEX idx_account_repositories_repository_id
                    ON account_repositories(repository_id);
                CREATE INDEX idx_account_managed_repositories_repository_id
                    ON account_managed_repositories(repository_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS account_managed_repositories CASCADE;
                DROP TABLE IF EXISTS account_repositories CASCADE;
                DROP TABLE IF EXISTS account_organizations CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
