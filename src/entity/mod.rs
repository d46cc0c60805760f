//! Database entity models for exploration sessions.
//!
//! This module contains the Sea-ORM entity definitions used by the
//! [`SessionStore`](crate::SessionStore). A session owns an append-only
//! transcript of messages; both tables are created by the crate's migrations.

/// Exploration session entity: one guided walk through a subject's dimensions.
pub mod exploration_session;

/// Transcript message entity: one row per intro, question, answer or feedback.
pub mod exploration_message;

pub use exploration_message::MessageType;
pub use exploration_session::SessionStatus;
