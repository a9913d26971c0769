use sea_orm::entity::prelude::*;

/// Email-identified account. `email` is stored trimmed and lowercased.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_language: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::login_tokens::Entity")]
    LoginTokens,
}

impl Related<super::login_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoginTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
