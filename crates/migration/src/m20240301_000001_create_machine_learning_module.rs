//! Create `machine_learning_module` table.
//! One row per registered model artifact; `version` backs optimistic locking.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MachineLearningModule::Table)
                    .if_not_exists()
                    .col(big_integer(MachineLearningModule::Id).primary_key().auto_increment())
                    .col(string_len(MachineLearningModule::Name, 100).not_null())
                    .col(boolean(MachineLearningModule::IsActive).not_null().default(false))
                    .col(
                        ColumnDef::new(MachineLearningModule::Description)
                            .string_len(1000)
                            .null(),
                    )
                    .col(string_len(MachineLearningModule::VersionNumber, 50).not_null())
                    .col(string_len(MachineLearningModule::Framework, 50).not_null())
                    .col(
                        ColumnDef::new(MachineLearningModule::TrainingStatus)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MachineLearningModule::LastTrainedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(string_len(MachineLearningModule::ModelPath, 500).not_null())
                    .col(
                        ColumnDef::new(MachineLearningModule::Accuracy)
                            .double()
                            .null(),
                    )
                    .col(timestamp_with_time_zone(MachineLearningModule::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MachineLearningModule::UpdatedAt).not_null())
                    .col(big_integer(MachineLearningModule::Version).not_null().default(1))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MachineLearningModule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MachineLearningModule {
    Table,
    Id,
    Name,
    IsActive,
    Description,
    VersionNumber,
    Framework,
    TrainingStatus,
    LastTrainedAt,
    ModelPath,
    Accuracy,
    CreatedAt,
    UpdatedAt,
    Version,
}
