use crate::constants::auth::{DEFAULT_API_KEY, DEFAULT_EMAIL, DEFAULT_USERNAME};
use crate::entities::{prelude::*, users};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Username,
                users::Column::Email,
                users::Column::ApiKey,
                users::Column::CreatedAt,
            ])
            .values_panic([
                DEFAULT_USERNAME.into(),
                DEFAULT_EMAIL.into(),
                DEFAULT_API_KEY.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Users)
            .and_where(
                sea_orm_migration::sea_query::Expr::col(users::Column::Username)
                    .eq(DEFAULT_USERNAME),
            )
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
