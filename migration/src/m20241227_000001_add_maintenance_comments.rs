use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceComments::Table)
                    .if_not_exists()
                    .col(pk_auto(MaintenanceComments::Id))
                    .col(integer(MaintenanceComments::RequestId))
                    .col(integer(MaintenanceComments::AuthorId))
                    .col(text(MaintenanceComments::Content))
                    .col(big_integer(MaintenanceComments::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Comments are listed per request in chronological order
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_maintenance_comments_request")
                    .table(MaintenanceComments::Table)
                    .col(MaintenanceComments::RequestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaintenanceComments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum MaintenanceComments {
    Table,
    Id,
    RequestId,
    AuthorId,
    Content,
    CreatedAt,
}
