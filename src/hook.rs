//! Post-completion side effects.

use async_trait::async_trait;

use crate::error::CompletionHookError;
use crate::insight::InsightsData;
use crate::subject::Scope;
use crate::transcript::Session;

/// Notified once a session has been committed as completed.
///
/// Typical implementations mark the related research method as done and
/// recompute the subject's aggregate validation score. The session is already
/// committed when this runs, so a failure is logged and otherwise ignored.
#[async_trait]
pub trait CompletionHook: Send + Sync {
    /// Returns the subject's new validation percentage, if the hook computes one.
    async fn on_completed(
        &self,
        session: &Session,
        insights: &InsightsData,
        scope: &Scope,
    ) -> Result<Option<u8>, CompletionHookError>;
}
