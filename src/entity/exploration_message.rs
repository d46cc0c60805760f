//! Transcript message entity model for Sea-ORM database interaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    #[sea_orm(string_value = "SYSTEM_INTRO")]
    SystemIntro,
    #[sea_orm(string_value = "AI_QUESTION")]
    AiQuestion,
    #[sea_orm(string_value = "USER_ANSWER")]
    UserAnswer,
    #[sea_orm(string_value = "AI_FEEDBACK")]
    AiFeedback,
}

/// Sea-ORM entity model representing one transcript message.
///
/// Rows are append-only. `(session_id, order_index)` is unique, which lets the
/// database reject a second writer that computed the same next index.
///
/// | Column      | Type               | Description                                  |
/// |-------------|--------------------|----------------------------------------------|
/// | id          | TEXT (Primary Key) | Message ID (UUID v4)                         |
/// | session_id  | TEXT               | Owning session, cascades on delete           |
/// | type        | TEXT               | See [`MessageType`]                          |
/// | content     | TEXT               | Message body                                 |
/// | order_index | INTEGER            | Position in the transcript                   |
/// | metadata    | JSON NULL          | `dimensionKey` / `dimensionTitle`            |
/// | created_at  | TIMESTAMPTZ        |                                              |
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exploration_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub session_id: String,
    #[sea_orm(column_name = "type")]
    pub message_type: MessageType,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub order_index: i32,
    #[sea_orm(nullable)]
    pub metadata: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exploration_session::Entity",
        from = "Column::SessionId",
        to = "super::exploration_session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,
}

impl Related<super::exploration_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
