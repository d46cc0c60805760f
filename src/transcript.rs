//! Typed views over persisted sessions and transcript messages.

use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::catalog::Dimension;
use crate::entity::{exploration_message, exploration_session, MessageType, SessionStatus};
use crate::error::{ExplorationError, Result};
use crate::insight::InsightsData;
use crate::subject::SubjectRef;

/// `round(answered / total * 100)`, rounding halves up.
///
/// A session with no dimensions counts as finished.
pub fn progress_for(answered: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    let answered = u64::from(answered.min(total));
    let total = u64::from(total);
    ((answered * 200 + total) / (2 * total)) as u8
}

/// Dimension a message pertains to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_title: Option<String>,
}

impl MessageMetadata {
    /// Metadata carried by questions: key and title.
    pub fn question(dimension: &Dimension) -> Self {
        Self {
            dimension_key: Some(dimension.key.clone()),
            dimension_title: Some(dimension.title.clone()),
        }
    }

    /// Metadata carried by answers and feedback: key only.
    pub fn dimension(dimension: &Dimension) -> Self {
        Self {
            dimension_key: Some(dimension.key.clone()),
            dimension_title: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.dimension_key.is_none() && self.dimension_title.is_none()
    }

    pub(crate) fn to_json(&self) -> Result<Option<serde_json::Value>> {
        if self.is_empty() {
            return Ok(None);
        }
        serde_json::to_value(self)
            .map(Some)
            .map_err(|e| ExplorationError::decode("message metadata", e))
    }
}

/// One transcript entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub order_index: u32,
    pub metadata: MessageMetadata,
    pub created_at: DateTimeWithTimeZone,
}

impl TryFrom<exploration_message::Model> for Message {
    type Error = ExplorationError;

    fn try_from(model: exploration_message::Model) -> Result<Self> {
        let metadata = match model.metadata {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ExplorationError::decode("message metadata", e))?,
            None => MessageMetadata::default(),
        };
        let order_index = u32::try_from(model.order_index)
            .map_err(|e| ExplorationError::decode("message order_index", e))?;
        Ok(Self {
            id: model.id,
            session_id: model.session_id,
            message_type: model.message_type,
            content: model.content,
            order_index,
            metadata,
            created_at: model.created_at,
        })
    }
}

/// One guided-exploration session.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub workspace_id: String,
    pub created_by: String,
    pub subject: SubjectRef,
    pub subject_category: String,
    pub status: SessionStatus,
    /// Dimension list captured when the session started.
    pub dimensions: Vec<Dimension>,
    pub total_dimensions: u32,
    pub answered_dimensions: u32,
    pub progress: u8,
    pub insights_data: Option<InsightsData>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// The next unanswered dimension, if any.
    pub fn current_dimension(&self) -> Option<&Dimension> {
        if self.answered_dimensions >= self.total_dimensions {
            return None;
        }
        self.dimensions.get(self.answered_dimensions as usize)
    }
}

impl TryFrom<exploration_session::Model> for Session {
    type Error = ExplorationError;

    fn try_from(model: exploration_session::Model) -> Result<Self> {
        let subject_type = model
            .subject_type
            .parse()
            .map_err(|e: String| ExplorationError::decode("subject_type", e))?;
        let dimensions: Vec<Dimension> = serde_json::from_value(model.dimensions)
            .map_err(|e| ExplorationError::decode("dimensions", e))?;
        let insights_data = model
            .insights_data
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ExplorationError::decode("insights_data", e))?;
        let total_dimensions = u32::try_from(model.total_dimensions)
            .map_err(|e| ExplorationError::decode("total_dimensions", e))?;
        let answered_dimensions = u32::try_from(model.answered_dimensions)
            .map_err(|e| ExplorationError::decode("answered_dimensions", e))?;

        Ok(Self {
            id: model.id,
            workspace_id: model.workspace_id,
            created_by: model.created_by,
            subject: SubjectRef::new(subject_type, model.subject_id),
            subject_category: model.subject_category,
            status: model.status,
            dimensions,
            total_dimensions,
            answered_dimensions,
            progress: progress_for(answered_dimensions, total_dimensions),
            insights_data,
            created_at: model.created_at,
            updated_at: model.updated_at,
            completed_at: model.completed_at,
        })
    }
}

/// A session together with its ordered transcript.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session: Session,
    pub messages: Vec<Message>,
}

impl SessionView {
    /// Converts a session row and its message rows, preserving order.
    pub(crate) fn from_models(
        session: exploration_session::Model,
        messages: Vec<exploration_message::Model>,
    ) -> Result<Self> {
        Ok(Self {
            session: session.try_into()?,
            messages: messages
                .into_iter()
                .map(Message::try_from)
                .collect::<Result<_>>()?,
        })
    }
}
