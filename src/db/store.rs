//! `LocalStore` backed by PostgreSQL through SeaORM.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use super::repositories::{self, model_to_organization, model_to_repository};
use crate::entity::{
    account_managed_repository, account_organization, account_repository, organization,
    repository,
};
use crate::error::AppResult;
use crate::models::{ActiveToggle, Organization, Repository, RepositoryUpdate, ToggleResponse};
use crate::store::LocalStore;

/// Runs every store call inside a transaction that is opened on first use and
/// closed by `commit`. Dropping the store with an open transaction rolls it back.
pub struct SeaOrmStore {
    db: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, txn: None }
    }

    async fn txn(&mut self) -> AppResult<&DatabaseTransaction> {
        let txn = match self.txn.take() {
            Some(txn) => txn,
            None => {
                debug!("Opening sync transaction");
                self.db.begin().await?
            }
        };
        Ok(self.txn.insert(txn))
    }
}

#[async_trait]
impl LocalStore for SeaOrmStore {
    async fn account_organizations(&mut self, account_id: Uuid) -> AppResult<BTreeSet<i64>> {
        let txn = self.txn().await?;
        let rows = account_organization::Entity::find()
            .filter(account_organization::Column::AccountId.eq(account_id))
            .all(txn)
            .await?;
        Ok(rows.into_iter().map(|m| m.organization_id).collect())
    }

    async fn account_repositories(&mut self, account_id: Uuid) -> AppResult<BTreeSet<i64>> {
        let txn = self.txn().await?;
        let rows = account_repository::Entity::find()
            .filter(account_repository::Column::AccountId.eq(account_id))
            .all(txn)
            .await?;
        Ok(rows.into_iter().map(|m| m.repository_id).collect())
    }

    async fn account_managed_repositories(
        &mut self,
        account_id: Uuid,
    ) -> AppResult<BTreeSet<i64>> {
        let txn = self.txn().await?;
        let rows = account_managed_repository::Entity::find()
            .filter(account_managed_repository::Column::AccountId.eq(account_id))
            .all(txn)
            .await?;
        Ok(rows.into_iter().map(|m| m.repository_id).collect())
    }

    async fn find_organization(&mut self, id: i64) -> AppResult<Option<Organization>> {
        let txn = self.txn().await?;
        let result = organization::Entity::find_by_id(id).one(txn).await?;
        Ok(result.map(model_to_organization))
    }

    async fn create_organization(&mut self, org: &Organization) -> AppResult<()> {
        let txn = self.txn().await?;
        let now = Utc::now();
        let model = organization::ActiveModel {
            id: Set(org.id),
            name: Set(org.name.clone()),
            login: Set(org.login.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        organization::Entity::insert(model).exec(txn).await?;
        Ok(())
    }

    async fn organization_repositories(
        &mut self,
        organization_id: i64,
    ) -> AppResult<BTreeSet<i64>> {
        let txn = self.txn().await?;
        let rows = repository::Entity::find()
            .select_only()
            .column(repository::Column::Id)
            .filter(repository::Column::OrganizationId.eq(organization_id))
            .into_tuple::<i64>()
            .all(txn)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn find_repository(&mut self, id: i64) -> AppResult<Option<Repository>> {
        let txn = self.txn().await?;
        let result = repository::Entity::find_by_id(id).one(txn).await?;
        Ok(result.map(model_to_repository))
    }

    async fn create_repository(&mut self, repo: &Repository) -> AppResult<()> {
        let txn = self.txn().await?;
        let now = Utc::now();
        let model = repository::ActiveModel {
            id: Set(repo.id),
            organization_id: Set(repo.organization_id),
            name: Set(repo.name.clone()),
            url: Set(repo.url.clone()),
            description: Set(repo.description.clone()),
            fork: Set(repo.fork),
            private: Set(repo.private),
            active: Set(repo.active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        repository::Entity::insert(model).exec(txn).await?;
        Ok(())
    }

    async fn update_repository(&mut self, id: i64, update: &RepositoryUpdate) -> AppResult<()> {
        let txn = self.txn().await?;
        repository::Entity::update_many()
            .filter(repository::Column::Id.eq(id))
            .col_expr(repository::Column::Name, Expr::value(update.name.clone()))
            .col_expr(repository::Column::Url, Expr::value(update.url.clone()))
            .col_expr(
                repository::Column::Description,
                Expr::value(update.description.clone()),
            )
            .col_expr(repository::Column::Fork, Expr::value(update.fork))
            .col_expr(repository::Column::Private, Expr::value(update.private))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn set_repository_organization(
        &mut self,
        id: i64,
        organization_id: Option<i64>,
    ) -> AppResult<()> {
        let txn = self.txn().await?;
        repository::Entity::update_many()
            .filter(repository::Column::Id.eq(id))
            .col_expr(
                repository::Column::OrganizationId,
                Expr::value(organization_id),
            )
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn add_membership(&mut self, account_id: Uuid, organization_id: i64) -> AppResult<()> {
        let txn = self.txn().await?;
        let model = account_organization::ActiveModel {
            account_id: Set(account_id),
            organization_id: Set(organization_id),
            created_at: Set(Utc::now()),
        };
        account_organization::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    account_organization::Column::AccountId,
                    account_organization::Column::OrganizationId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
        Ok(())
    }

    async fn remove_membership(
        &mut self,
        account_id: Uuid,
        organization_id: i64,
    ) -> AppResult<()> {
        let txn = self.txn().await?;
        account_organization::Entity::delete_many()
            .filter(account_organization::Column::AccountId.eq(account_id))
            .filter(account_organization::Column::OrganizationId.eq(organization_id))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn add_followed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        let txn = self.txn().await?;
        let model = account_repository::ActiveModel {
            account_id: Set(account_id),
            repository_id: Set(repository_id),
            created_at: Set(Utc::now()),
        };
        account_repository::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    account_repository::Column::AccountId,
                    account_repository::Column::RepositoryId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
        Ok(())
    }

    async fn remove_followed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        let txn = self.txn().await?;
        account_repository::Entity::delete_many()
            .filter(account_repository::Column::AccountId.eq(account_id))
            .filter(account_repository::Column::RepositoryId.eq(repository_id))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn add_managed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        let txn = self.txn().await?;
        let model = account_managed_repository::ActiveModel {
            account_id: Set(account_id),
            repository_id: Set(repository_id),
            created_at: Set(Utc::now()),
        };
        account_managed_repository::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    account_managed_repository::Column::AccountId,
                    account_managed_repository::Column::RepositoryId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
        Ok(())
    }

    async fn remove_managed(&mut self, account_id: Uuid, repository_id: i64) -> AppResult<()> {
        let txn = self.txn().await?;
        account_managed_repository::Entity::delete_many()
            .filter(account_managed_repository::Column::AccountId.eq(account_id))
            .filter(account_managed_repository::Column::RepositoryId.eq(repository_id))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn set_active(
        &mut self,
        account_id: Uuid,
        toggle: &ActiveToggle,
    ) -> AppResult<ToggleResponse> {
        let txn = self.txn().await?;
        repositories::set_active(txn, account_id, toggle).await
    }

    async fn commit(&mut self) -> AppResult<()> {
        if let Some(txn) = self.txn.take() {
            txn.commit().await?;
            debug!("Committed sync transaction");
        }
        Ok(())
    }
}
