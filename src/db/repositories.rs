//! Database queries for repositories visible to an account.

use std::collections::BTreeMap;

use sea_orm::sea_query::Query;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{
    account_managed_repository, account_organization, account_repository, organization, repository,
};
use crate::error::AppResult;
use crate::models::{ActiveToggle, Organization, Repository, RepositoryListResponse, ToggleResponse};

/// Apply an active toggle with two bulk updates. Rows the account does not
/// manage are left alone.
pub async fn set_active<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
    toggle: &ActiveToggle,
) -> AppResult<ToggleResponse> {
    let activated = bulk_set_active(db, account_id, &toggle.activate, true).await?;
    let deactivated = bulk_set_active(db, account_id, &toggle.deactivate, false).await?;

    Ok(ToggleResponse {
        activated,
        deactivated,
    })
}

async fn bulk_set_active<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
    ids: &[i64],
    active: bool,
) -> AppResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let managed = Query::select()
        .column(account_managed_repository::Column::RepositoryId)
        .from(account_managed_repository::Entity)
        .and_where(account_managed_repository::Column::AccountId.eq(account_id))
        .to_owned();

    let result = repository::Entity::update_many()
        .filter(repository::Column::Id.is_in(ids.iter().copied()))
        .filter(repository::Column::Id.in_subquery(managed))
        .col_expr(repository::Column::Active, Expr::value(active))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Group the account's repositories the way the repositories page shows them.
///
/// Organization groups only cover organizations the account is a member of.
pub async fn list_for_account<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
) -> AppResult<RepositoryListResponse> {
    let followed = account_repository::Entity::find()
        .filter(account_repository::Column::AccountId.eq(account_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.repository_id);

    let followed = repository::Entity::find()
        .filter(repository::Column::Id.is_in(followed))
        .order_by_asc(repository::Column::Name)
        .all(db)
        .await?;

    let (fork_repositories, own_repositories): (Vec<_>, Vec<_>) = followed
        .into_iter()
        .map(model_to_repository)
        .partition(|r| r.fork);

    let managed = account_managed_repository::Entity::find()
        .filter(account_managed_repository::Column::AccountId.eq(account_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.repository_id);

    let member_of = Query::select()
        .column(account_organization::Column::OrganizationId)
        .from(account_organization::Entity)
        .and_where(account_organization::Column::AccountId.eq(account_id))
        .to_owned();

    let managed_in_orgs = repository::Entity::find()
        .filter(repository::Column::Id.is_in(managed))
        .filter(repository::Column::OrganizationId.in_subquery(member_of))
        .order_by_asc(repository::Column::Name)
        .find_also_related(organization::Entity)
        .all(db)
        .await?;

    let mut organization_repositories: BTreeMap<String, Vec<Repository>> = BTreeMap::new();
    for (repo, org) in managed_in_orgs {
        let Some(org) = org else {
            continue;
        };
        let org = model_to_organization(org);
        organization_repositories
            .entry(org.display_name().to_string())
            .or_default()
            .push(model_to_repository(repo));
    }

    Ok(RepositoryListResponse {
        own_repositories,
        fork_repositories,
        organization_repositories,
    })
}

pub(crate) fn model_to_repository(m: repository::Model) -> Repository {
    Repository {
        id: m.id,
        name: m.name,
        url: m.url,
        description: m.description,
        fork: m.fork,
        private: m.private,
        active: m.active,
        organization_id: m.organization_id,
    }
}

pub(crate) fn model_to_organization(m: organization::Model) -> Organization {
    Organization {
        id: m.id,
        name: m.name,
        login: m.login,
    }
}
