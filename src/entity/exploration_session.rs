//! Exploration session entity model for Sea-ORM database interaction.
//!
//! Maps to the `exploration_session` table. Rows are written only by the
//! [`SessionStore`](crate::SessionStore); callers normally work with the typed
//! [`Session`](crate::Session) view instead.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a session. `Completed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// Sea-ORM entity model representing one exploration session.
///
/// # Database Schema
///
/// | Column              | Type               | Description                                   |
/// |---------------------|--------------------|-----------------------------------------------|
/// | id                  | TEXT (Primary Key) | Session ID (UUID v4)                          |
/// | workspace_id        | TEXT               | Owning workspace                              |
/// | created_by          | TEXT               | Caller that started the session               |
/// | subject_type        | TEXT               | Kind of subject (persona, brand asset, ...)   |
/// | subject_id          | TEXT               | Referenced subject, never owned               |
/// | subject_category    | TEXT               | Catalog category the dimensions came from     |
/// | status              | TEXT               | `IN_PROGRESS` or `COMPLETED`                  |
/// | dimensions          | JSON               | Snapshot of the ordered dimension list        |
/// | total_dimensions    | INTEGER            | Length of the snapshot                        |
/// | answered_dimensions | INTEGER            | Answers recorded so far                       |
/// | progress            | INTEGER            | Percentage derived from the two counters      |
/// | insights_data       | JSON NULL          | Generated insights, set once on completion    |
/// | created_at          | TIMESTAMPTZ        |                                               |
/// | updated_at          | TIMESTAMPTZ        |                                               |
/// | completed_at        | TIMESTAMPTZ NULL   | Set once on completion                        |
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exploration_session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub workspace_id: String,
    #[sea_orm(column_type = "Text")]
    pub created_by: String,
    #[sea_orm(column_type = "Text")]
    pub subject_type: String,
    #[sea_orm(column_type = "Text")]
    pub subject_id: String,
    #[sea_orm(column_type = "Text")]
    pub subject_category: String,
    pub status: SessionStatus,
    pub dimensions: Json,
    pub total_dimensions: i32,
    pub answered_dimensions: i32,
    pub progress: i32,
    #[sea_orm(nullable)]
    pub insights_data: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exploration_message::Entity")]
    Message,
}

impl Related<super::exploration_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
