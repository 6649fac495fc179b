//! Account entity for GitHub-authenticated users.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub github_id: i64,
    pub github_login: String,
    pub github_token: String,
    #[sea_orm(unique)]
    pub github_token_hash: String,
    pub gravatar_id: Option<String>,
    pub hooks_token: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_organization::Entity")]
    Memberships,
    #[sea_orm(has_many = "super::account_repository::Entity")]
    FollowedRepositories,
    #[sea_orm(has_many = "super::account_managed_repository::Entity")]
    ManagedRepositories,
}

impl Related<super::account_organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
