//! Migration: Create accounts table and shared trigger function.
//!
//! One row per GitHub user who has signed in.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE accounts (
                    id UUID PRIMARY KEY,
                    github_id BIGINT NOT NULL UNIQUE,
                    github_login VARCHAR(100) NOT NULL,
                    github_token VARCHAR(255) NOT NULL,
                    -- SHA-256 hex of github_token, used for request authentication
                    github_token_hash CHAR(64) NOT NULL UNIQUE,
                    gravatar_id VARCHAR(64),
                    hooks_token CHAR(64),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_accounts_github_login ON accounts(github_login);

                CREATE TRIGGER update_accounts_updated_at
                    BEFORE UPDATE ON accounts
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
                DROP TRIGGER IF EXISTS update_accounts_updated_at ON accounts;
                DROP TABLE IF EXISTS accounts CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
