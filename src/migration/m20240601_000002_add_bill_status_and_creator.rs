use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Columns are added nullable so rows written under the first version keep
// NULL; the read path maps those to their documented defaults.
//
// `bills.status` gets no column default: `ADD COLUMN .. DEFAULT` backfills
// existing rows, which would turn legacy sales into PENDING bills. New rows
// always carry an explicit status (PENDING) from the insert path.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Bills::Table)
                    .add_column(ColumnDef::new(Bills::Status).string_len(20).null())
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Bills::Table)
                    .add_column(ColumnDef::new(Bills::CreatedByUserId).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Products::Table)
                    .add_column(ColumnDef::new(Products::ImagePath).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bills_status")
                    .table(Bills::Table)
                    .col(Bills::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_bills_status").table(Bills::Table).to_owned())
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Products::Table)
                    .drop_column(Products::ImagePath)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Bills::Table)
                    .drop_column(Bills::CreatedByUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Bills::Table)
                    .drop_column(Bills::Status)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Bills {
    Table,
    Status,
    CreatedByUserId,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    ImagePath,
}
