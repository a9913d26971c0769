use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr, sea_query::Expr,
};
use uuid::Uuid;

use folio_api_schema::{login_tokens, users};

use crate::domain::repository::{LoginTokenRepository, UserRepository};
use crate::domain::types::{LoginToken, ProfileUpdate, User};
use crate::error::ApiError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            preferred_language: Set(user.preferred_language.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ApiError::UserAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_profile(&self, id: Uuid, changes: &ProfileUpdate) -> Result<User, ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(first_name) = &changes.first_name {
            am.first_name = Set(Some(first_name.clone()));
        }
        if let Some(last_name) = &changes.last_name {
            am.last_name = Set(Some(last_name.clone()));
        }
        if let Some(language) = &changes.preferred_language {
            am.preferred_language = Set(Some(language.clone()));
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.context("update user profile")?;
        Ok(user_from_model(model))
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        preferred_language: model.preferred_language,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── LoginToken repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLoginTokenRepository {
    pub db: DatabaseConnection,
}

impl LoginTokenRepository for DbLoginTokenRepository {
    async fn find_active(&self, user_id: Uuid) -> Result<Option<LoginToken>, ApiError> {
        let now = Utc::now();
        let model = login_tokens::Entity::find()
            .filter(login_tokens::Column::UserId.eq(user_id))
            .filter(login_tokens::Column::Revoked.eq(false))
            .filter(login_tokens::Column::ConsumedAt.is_null())
            .filter(login_tokens::Column::ExpiresAt.gt(now))
            .order_by_desc(login_tokens::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find active login token")?;
        Ok(model.map(login_token_from_model))
    }

    async fn revoke_active(&self, user_id: Uuid) -> Result<u64, ApiError> {
        let result = login_tokens::Entity::update_many()
            .col_expr(login_tokens::Column::Revoked, Expr::value(true))
            .col_expr(login_tokens::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(login_tokens::Column::UserId.eq(user_id))
            .filter(login_tokens::Column::Revoked.eq(false))
            .filter(login_tokens::Column::ConsumedAt.is_null())
            .exec(&self.db)
            .await
            .context("revoke active login tokens")?;
        Ok(result.rows_affected)
    }

    async fn code_exists(&self, code: &str) -> Result<bool, ApiError> {
        let count = login_tokens::Entity::find()
            .filter(login_tokens::Column::Code.eq(code))
            .count(&self.db)
            .await
            .context("check login code uniqueness")?;
        Ok(count > 0)
    }

    async fn try_insert(&self, token: &LoginToken) -> Result<bool, ApiError> {
        let result = login_tokens::ActiveModel {
            id: Set(token.id),
            code: Set(token.code.clone()),
            user_id: Set(token.user_id),
            expires_at: Set(token.expires_at),
            consumed_at: Set(token.consumed_at),
            revoked: Set(token.revoked),
            created_at: Set(token.created_at),
            updated_at: Set(token.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("insert login token").into()),
        }
    }

    async fn find_unrevoked(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<LoginToken>, ApiError> {
        let model = login_tokens::Entity::find()
            .filter(login_tokens::Column::UserId.eq(user_id))
            .filter(login_tokens::Column::Code.eq(code))
            .filter(login_tokens::Column::Revoked.eq(false))
            .one(&self.db)
            .await
            .context("find login token by code")?;
        Ok(model.map(login_token_from_model))
    }

    async fn consume(&self, id: Uuid) -> Result<bool, ApiError> {
        let now = Utc::now();
        // Conditional update: of two concurrent verifications only one sees a row.
        let result = login_tokens::Entity::update_many()
            .col_expr(login_tokens::Column::ConsumedAt, Expr::value(now))
            .col_expr(login_tokens::Column::Revoked, Expr::value(true))
            .col_expr(login_tokens::Column::UpdatedAt, Expr::value(now))
            .filter(login_tokens::Column::Id.eq(id))
            .filter(login_tokens::Column::ConsumedAt.is_null())
            .filter(login_tokens::Column::Revoked.eq(false))
            .exec(&self.db)
            .await
            .context("consume login token")?;
        Ok(result.rows_affected == 1)
    }
}

fn login_token_from_model(model: login_tokens::Model) -> LoginToken {
    LoginToken {
        id: model.id,
        code: model.code,
        user_id: model.user_id,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
        revoked: model.revoked,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
