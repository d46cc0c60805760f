use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExplorationSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExplorationSession::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExplorationSession::WorkspaceId).text().not_null())
                    .col(ColumnDef::new(ExplorationSession::CreatedBy).text().not_null())
                    .col(ColumnDef::new(ExplorationSession::SubjectType).text().not_null())
                    .col(ColumnDef::new(ExplorationSession::SubjectId).text().not_null())
                    .col(
                        ColumnDef::new(ExplorationSession::SubjectCategory)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExplorationSession::Status).text().not_null())
                    .col(ColumnDef::new(ExplorationSession::Dimensions).json().not_null())
                    .col(
                        ColumnDef::new(ExplorationSession::TotalDimensions)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExplorationSession::AnsweredDimensions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExplorationSession::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ExplorationSession::InsightsData).json().null())
                    .col(
                        ColumnDef::new(ExplorationSession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExplorationSession::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExplorationSession::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup for "is there already an in-progress session for this subject"
        manager
            .create_index(
                Index::create()
                    .name("idx_exploration_session_subject")
                    .table(ExplorationSession::Table)
                    .col(ExplorationSession::WorkspaceId)
                    .col(ExplorationSession::SubjectType)
                    .col(ExplorationSession::SubjectId)
                    .col(ExplorationSession::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExplorationMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExplorationMessage::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExplorationMessage::SessionId).text().not_null())
                    .col(ColumnDef::new(ExplorationMessage::Type).text().not_null())
                    .col(ColumnDef::new(ExplorationMessage::Content).text().not_null())
                    .col(ColumnDef::new(ExplorationMessage::OrderIndex).integer().not_null())
                    .col(ColumnDef::new(ExplorationMessage::Metadata).json().null())
                    .col(
                        ColumnDef::new(ExplorationMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exploration_message_session")
                            .from(ExplorationMessage::Table, ExplorationMessage::SessionId)
                            .to(ExplorationSession::Table, ExplorationSession::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exploration_message_order")
                    .table(ExplorationMessage::Table)
                    .col(ExplorationMessage::SessionId)
                    .col(ExplorationMessage::OrderIndex)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExplorationMessage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExplorationSession::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ExplorationSession {
    Table,
    Id,
    WorkspaceId,
    CreatedBy,
    SubjectType,
    SubjectId,
    SubjectCategory,
    Status,
    Dimensions,
    TotalDimensions,
    AnsweredDimensions,
    Progress,
    InsightsData,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum ExplorationMessage {
    Table,
    Id,
    SessionId,
    Type,
    Content,
    OrderIndex,
    Metadata,
    CreatedAt,
}
