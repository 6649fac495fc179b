//! Migration: Create repositories table.
//!
//! Keyed by GitHub's repository id. `active` defaults to false so that
//! newly discovered repositories need an explicit opt-in.

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
                CREATE TABLE repositories (
                    id BIGINT PRIMARY KEY,
                    organization_id BIGINT REFERENCES organizations(id) ON DELETE SET NULL,
                    name VARCHAR(255) NOT NULL,
                    url VARCHAR(500) NOT NULL,
                    description TEXT,
                    fork BOOLEAN NOT NULL DEFAULT FALSE,
                    private BOOLEAN NOT NULL DEFAULT FALSE,
                    active BOOLEAN NOT NULL DEFAULT FALSE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Organization repository listing
                CREATE INDEX idx_repositories_organization_id
                    ON repositories(organization_id)
                    WHERE organization_id IS NOT NULL;

                -- Active repositories picked up by CI
                CREATE INDEX idx_repositories_active
                    ON repositories(id)
                    WHERE active;

                CREATE TRIGGER update_repositories_updated_at
                    BEFORE UPDATE ON repositories
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
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
                DROP TRIGGER IF EXISTS update_repositories_updated_at ON repositories;
                DROP TABLE IF EXISTS repositories CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
