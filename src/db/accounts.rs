//! Database operations for accounts.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entity::account;
use crate::error::{AppError, AppResult};
use crate::models::{Account, RemoteUser};

/// Hash a provider token using SHA-256. Only the hash is ever used for lookups.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random hooks token: 32 random bytes, hex encoded.
pub fn generate_hooks_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// Find the account that signed in with this token.
pub async fn find_by_token_hash(
    db: &DatabaseConnection,
    token_hash: &str,
) -> AppResult<Option<Account>> {
    let result = account::Entity::find()
        .filter(account::Column::GithubTokenHash.eq(token_hash))
        .one(db)
        .await?;

    Ok(result.map(model_to_account))
}

/// Find or create an account by GitHub ID. Refreshes login, gravatar and token on each sign-in.
pub async fn upsert_from_github(
    db: &DatabaseConnection,
    user: &RemoteUser,
    token: &SecretString,
) -> AppResult<Account> {
    let token_hash = hash_token(token.expose_secret());

    let existing = account::Entity::find()
        .filter(account::Column::GithubId.eq(user.id))
        .one(db)
        .await?;

    if let Some(m) = existing {
        let mut active: account::ActiveModel = m.into();
        active.github_login = Set(user.login.clone());
        active.gravatar_id = Set(user.gravatar_id.clone());
        active.github_token = Set(token.expose_secret().to_string());
        active.github_token_hash = Set(token_hash);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;
        return Ok(model_to_account(updated));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    let model = account::ActiveModel {
        id: Set(id),
        github_id: Set(user.id),
        github_login: Set(user.login.clone()),
        github_token: Set(token.expose_secret().to_string()),
        github_token_hash: Set(token_hash),
        gravatar_id: Set(user.gravatar_id.clone()),
        hooks_token: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    account::Entity::insert(model).exec(db).await?;

    let inserted = account::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Database("Failed to fetch newly inserted account".to_string()))?;

    Ok(model_to_account(inserted))
}

/// Replace the account's hooks token and return the new value.
pub async fn rotate_hooks_token(db: &DatabaseConnection, id: Uuid) -> AppResult<String> {
    let token = generate_hooks_token();

    let result = account::Entity::update_many()
        .filter(account::Column::Id.eq(id))
        .col_expr(account::Column::HooksToken, Expr::value(Some(token.clone())))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Account {}", id)));
    }

    Ok(token)
}

fn model_to_account(m: account::Model) -> Account {
    Account {
        id: m.id,
        github_id: m.github_id,
        github_login: m.github_login,
        github_token: SecretString::from(m.github_token),
        gravatar_id: m.gravatar_id,
        hooks_token: m.hooks_token,
        created_at: m.created_at,
    }
}
