use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginTokens::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    // Globally unique: the final guard against two requests minting the same code.
                    .col(
                        ColumnDef::new(LoginTokens::Code)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LoginTokens::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(LoginTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoginTokens::ConsumedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LoginTokens::Revoked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LoginTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoginTokens::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LoginTokens::Table, LoginTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LoginTokens::Table)
                    .col(LoginTokens::UserId)
                    .name("idx_login_tokens_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LoginTokens {
    Table,
    Id,
    Code,
    UserId,
    ExpiresAt,
    ConsumedAt,
    Revoked,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
