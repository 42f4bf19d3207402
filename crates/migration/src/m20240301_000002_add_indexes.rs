use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Name lookups (search, exists-by-name)
        manager
            .create_index(
                Index::create()
                    .name("idx_ml_module_name")
                    .table(MachineLearningModule::Table)
                    .col(MachineLearningModule::Name)
                    .to_owned(),
            )
            .await?;

        // Default list order, date-range and recency queries
        manager
            .create_index(
                Index::create()
                    .name("idx_ml_module_created_at")
                    .table(MachineLearningModule::Table)
                    .col(MachineLearningModule::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ml_module_training_status")
                    .table(MachineLearningModule::Table)
                    .col(MachineLearningModule::TrainingStatus)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_ml_module_name").table(MachineLearningModule::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ml_module_created_at").table(MachineLearningModule::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ml_module_training_status").table(MachineLearningModule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MachineLearningModule { Table, Name, CreatedAt, TrainingStatus }
