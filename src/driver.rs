//! The guided-session state machine.
//!
//! A session moves from `IN_PROGRESS` to `COMPLETED` and never back. The
//! transcript grows as intro, Q1, A1, F1, Q2, A2, F2, ... and every transition
//! commits its counter update and its messages together or not at all.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{Dimension, DimensionCatalog};
use crate::config::DriverConfig;
use crate::entity::{exploration_session, MessageType, SessionStatus};
use crate::error::{ExplorationError, GenerationError, Result};
use crate::hook::CompletionHook;
use crate::insight::{fallback_feedback, InsightGenerator, InsightRequest, InsightsData};
use crate::store::{now_db, Expected, NewSession, SessionPatch, SessionStore};
use crate::subject::{Scope, Subject, SubjectRef, SubjectRegistry, SubjectRepository, SubjectType};
use crate::transcript::{Message, MessageMetadata, Session, SessionView};

/// Result of [`ExplorationDriver::start`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOutcome {
    pub session_id: String,
    pub status: SessionStatus,
    pub progress: u8,
    pub total_dimensions: u32,
    pub answered_dimensions: u32,
    pub messages: Vec<Message>,
    /// `true` when an existing in-progress session was returned.
    pub resumed: bool,
}

impl StartOutcome {
    fn new(view: SessionView, resumed: bool) -> Self {
        Self {
            session_id: view.session.id,
            status: view.session.status,
            progress: view.session.progress,
            total_dimensions: view.session.total_dimensions,
            answered_dimensions: view.session.answered_dimensions,
            messages: view.messages,
            resumed,
        }
    }
}

/// Result of [`ExplorationDriver::answer`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub feedback: Message,
    /// `None` once the last dimension has been answered.
    pub next_question: Option<Message>,
    pub progress: u8,
    pub answered_dimensions: u32,
    pub is_complete: bool,
}

/// Result of [`ExplorationDriver::complete`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOutcome {
    pub status: SessionStatus,
    pub insights_data: InsightsData,
    pub research_boost: u8,
    /// Reported by a completion hook; `None` if no hook computed one.
    pub validation_percentage: Option<u8>,
}

/// Drives exploration sessions through start, answer and complete.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use branddock_exploration::{
///     ExplorationDriver, Scope, SessionStore, SubjectRef, SubjectType, TemplateInsightGenerator,
/// };
///
/// # async fn example(
/// #     conn: sea_orm::DatabaseConnection,
/// #     personas: Arc<dyn branddock_exploration::SubjectRepository>,
/// # ) -> Result<(), branddock_exploration::ExplorationError> {
/// let driver = ExplorationDriver::new(SessionStore::new(conn), Arc::new(TemplateInsightGenerator::new()))
///     .with_subject_repository(SubjectType::Persona, personas);
///
/// let scope = Scope::new("workspace-1", "user-1");
/// let started = driver
///     .start(&scope, SubjectRef::new(SubjectType::Persona, "p1"), "persona")
///     .await?;
/// let answer = driver.answer(&scope, &started.session_id, "25-34, urban").await?;
/// if answer.is_complete {
///     driver.complete(&scope, &started.session_id).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct ExplorationDriver {
    store: SessionStore,
    catalog: Arc<DimensionCatalog>,
    subjects: SubjectRegistry,
    generator: Arc<dyn InsightGenerator>,
    hooks: Vec<Arc<dyn CompletionHook>>,
    config: DriverConfig,
}

impl ExplorationDriver {
    /// Creates a driver using the built-in dimension catalog and default config.
    pub fn new(store: SessionStore, generator: Arc<dyn InsightGenerator>) -> Self {
        Self {
            store,
            catalog: Arc::new(DimensionCatalog::builtin()),
            subjects: SubjectRegistry::new(),
            generator,
            hooks: Vec::new(),
            config: DriverConfig::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: impl Into<Arc<DimensionCatalog>>) -> Self {
        self.catalog = catalog.into();
        self
    }

    pub fn with_subject_repository(
        mut self,
        subject_type: SubjectType,
        repository: Arc<dyn SubjectRepository>,
    ) -> Self {
        self.subjects.register(subject_type, repository);
        self
    }

    /// Adds a hook run after every successful completion, in registration order.
    pub fn with_completion_hook(mut self, hook: Arc<dyn CompletionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Opens a session for `subject`, asking the first dimension's question.
    ///
    /// If an `IN_PROGRESS` session already exists for the subject in this
    /// workspace it is returned unchanged with `resumed = true` (unless
    /// [`DriverConfig::reuse_in_progress`] is off). The lookup ignores
    /// `subject_category`; the resumed session keeps its own dimensions.
    #[instrument(
        skip(self, scope, subject),
        fields(
            workspace_id = %scope.workspace_id,
            subject_type = %subject.subject_type,
            subject_id = %subject.subject_id,
        )
    )]
    pub async fn start(
        &self,
        scope: &Scope,
        subject: SubjectRef,
        subject_category: &str,
    ) -> Result<StartOutcome> {
        let dimensions = self.catalog.resolve(subject_category)?;
        let first = dimensions
            .first()
            .ok_or_else(|| ExplorationError::UnsupportedCategory(subject_category.to_string()))?;

        let record = self
            .subjects
            .fetch(&subject, scope)
            .await?
            .ok_or_else(|| ExplorationError::not_found("subject", subject.subject_id.as_str()))?;

        let conn = self.store.connection();
        if self.config.reuse_in_progress {
            if let Some(existing) = self.store.find_in_progress(conn, scope, &subject).await? {
                info!(session_id = %existing.id, "resuming in-progress exploration session");
                let messages = self.store.list_messages(conn, &existing.id).await?;
                return Ok(StartOutcome::new(
                    SessionView::from_models(existing, messages)?,
                    true,
                ));
            }
        }

        let txn = self.store.begin().await?;
        let session = self
            .store
            .create_session(
                &txn,
                NewSession {
                    scope,
                    subject: &subject,
                    subject_category,
                    dimensions,
                },
            )
            .await?;
        let intro = self
            .store
            .append_message(
                &txn,
                &session.id,
                MessageType::SystemIntro,
                &intro_text(&record, dimensions.len()),
                0,
                &MessageMetadata::default(),
            )
            .await?;
        let question = self
            .store
            .append_message(
                &txn,
                &session.id,
                MessageType::AiQuestion,
                &first.question,
                1,
                &MessageMetadata::question(first),
            )
            .await?;
        txn.commit().await?;

        info!(
            session_id = %session.id,
            total_dimensions = dimensions.len(),
            "started exploration session"
        );
        Ok(StartOutcome::new(
            SessionView::from_models(session, vec![intro, question])?,
            false,
        ))
    }

    /// Records an answer to the current dimension and moves to the next one.
    ///
    /// Feedback generation never fails this call: on error or timeout a fixed
    /// acknowledgement is stored instead. Reaching the last dimension only sets
    /// `is_complete`; the caller finishes the session with [`Self::complete`].
    #[instrument(
        skip(self, scope, session_id, content),
        fields(workspace_id = %scope.workspace_id, session_id = %session_id)
    )]
    pub async fn answer(
        &self,
        scope: &Scope,
        session_id: &str,
        content: &str,
    ) -> Result<AnswerOutcome> {
        let conn = self.store.connection();
        let session = self.visible_session(scope, session_id).await?;
        if session.is_completed() {
            return Err(ExplorationError::AlreadyCompleted(session.id));
        }
        let current_index = session.answered_dimensions;
        let dimension = session
            .current_dimension()
            .cloned()
            .ok_or_else(|| ExplorationError::AlreadyCompleted(session.id.clone()))?;

        let transcript = self.store.list_messages(conn, session_id).await?;
        let last = transcript
            .last()
            .ok_or_else(|| ExplorationError::decode("transcript", "session has no messages"))?;
        let next_index = u32::try_from(last.order_index)
            .map_err(|e| ExplorationError::decode("message order_index", e))?
            + 1;

        let feedback_text = self.feedback_for(session_id, &dimension, content).await;

        let answered = current_index + 1;
        let total = session.total_dimensions;
        let is_complete = answered >= total;
        let next_dimension = if is_complete {
            None
        } else {
            session.dimensions.get(answered as usize)
        };

        let txn = self.store.begin().await?;
        let updated = self
            .store
            .update_session(
                &txn,
                session_id,
                SessionPatch::answered(answered, total),
                Some(Expected {
                    answered_dimensions: current_index,
                    status: SessionStatus::InProgress,
                }),
            )
            .await?;
        self.store
            .append_message(
                &txn,
                session_id,
                MessageType::UserAnswer,
                content,
                next_index,
                &MessageMetadata::dimension(&dimension),
            )
            .await?;
        let feedback = self
            .store
            .append_message(
                &txn,
                session_id,
                MessageType::AiFeedback,
                &feedback_text,
                next_index + 1,
                &MessageMetadata::dimension(&dimension),
            )
            .await?;
        let next_question = match next_dimension {
            Some(next) => Some(
                self.store
                    .append_message(
                        &txn,
                        session_id,
                        MessageType::AiQuestion,
                        &next.question,
                        next_index + 2,
                        &MessageMetadata::question(next),
                    )
                    .await?,
            ),
            None => None,
        };
        txn.commit().await?;

        let updated = Session::try_from(updated)?;
        debug!(
            dimension_key = %dimension.key,
            answered_dimensions = updated.answered_dimensions,
            progress = updated.progress,
            is_complete,
            "recorded answer"
        );
        Ok(AnswerOutcome {
            feedback: feedback.try_into()?,
            next_question: next_question.map(Message::try_from).transpose()?,
            progress: updated.progress,
            answered_dimensions: updated.answered_dimensions,
            is_complete,
        })
    }

    /// Generates insights and moves the session to `COMPLETED`.
    ///
    /// Insight generation failures are returned as
    /// [`ExplorationError::GenerationUnavailable`] and leave the session
    /// untouched. Completion hooks run after the session is committed; their
    /// failures are logged only.
    #[instrument(
        skip(self, scope, session_id),
        fields(workspace_id = %scope.workspace_id, session_id = %session_id)
    )]
    pub async fn complete(&self, scope: &Scope, session_id: &str) -> Result<CompleteOutcome> {
        let conn = self.store.connection();
        let session = self.visible_session(scope, session_id).await?;
        if session.is_completed() {
            return Err(ExplorationError::AlreadyCompleted(session.id));
        }

        let transcript = self
            .store
            .list_messages(conn, session_id)
            .await?
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>>>()?;
        let subject = self
            .subjects
            .fetch(&session.subject, scope)
            .await?
            .ok_or_else(|| {
                ExplorationError::not_found("subject", session.subject.subject_id.as_str())
            })?;

        let insights = self
            .bounded(self.generator.insights(InsightRequest {
                subject: &subject,
                dimensions: &session.dimensions,
                transcript: &transcript,
            }))
            .await
            .map_err(|err| {
                error!(failure_kind = err.kind(), error = %err, "insight generation failed");
                ExplorationError::from(err)
            })?;

        let completed = self
            .store
            .update_session(
                conn,
                session_id,
                SessionPatch {
                    answered_dimensions: Some(session.total_dimensions),
                    progress: Some(100),
                    status: Some(SessionStatus::Completed),
                    insights_data: Some(insights.clone()),
                    completed_at: Some(now_db()),
                },
                Some(Expected {
                    answered_dimensions: session.answered_dimensions,
                    status: SessionStatus::InProgress,
                }),
            )
            .await?;
        let completed = Session::try_from(completed)?;
        info!(
            answered_before_completion = session.answered_dimensions,
            total_dimensions = session.total_dimensions,
            "completed exploration session"
        );

        let validation_percentage = self.run_hooks(&completed, &insights, scope).await;
        Ok(CompleteOutcome {
            status: completed.status,
            research_boost: insights.research_boost,
            insights_data: insights,
            validation_percentage,
        })
    }

    /// The session and its transcript, as the caller left them.
    #[instrument(
        skip(self, scope, session_id),
        fields(workspace_id = %scope.workspace_id, session_id = %session_id)
    )]
    pub async fn session(&self, scope: &Scope, session_id: &str) -> Result<SessionView> {
        let conn = self.store.connection();
        let model = self.visible_model(scope, session_id).await?;
        let messages = self.store.list_messages(conn, session_id).await?;
        SessionView::from_models(model, messages)
    }

    async fn visible_model(
        &self,
        scope: &Scope,
        session_id: &str,
    ) -> Result<exploration_session::Model> {
        let model = self
            .store
            .get_session(self.store.connection(), session_id)
            .await?;
        // Sessions of other workspaces are indistinguishable from missing ones
        if model.workspace_id != scope.workspace_id {
            return Err(ExplorationError::not_found("session", session_id));
        }
        Ok(model)
    }

    async fn visible_session(&self, scope: &Scope, session_id: &str) -> Result<Session> {
        self.visible_model(scope, session_id).await?.try_into()
    }

    async fn feedback_for(&self, session_id: &str, dimension: &Dimension, answer: &str) -> String {
        match self.bounded(self.generator.feedback(dimension, answer)).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(
                    session_id,
                    dimension_key = %dimension.key,
                    failure_kind = "empty",
                    "feedback generation returned nothing, using fallback"
                );
                fallback_feedback(dimension)
            }
            Err(err) => {
                warn!(
                    session_id,
                    dimension_key = %dimension.key,
                    failure_kind = err.kind(),
                    error = %err,
                    "feedback generation failed, using fallback"
                );
                fallback_feedback(dimension)
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, GenerationError>>,
    ) -> std::result::Result<T, GenerationError> {
        let limit = self.config.generation_timeout;
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(GenerationError::Timeout(limit)))
    }

    async fn run_hooks(
        &self,
        session: &Session,
        insights: &InsightsData,
        scope: &Scope,
    ) -> Option<u8> {
        let mut validation_percentage = None;
        for hook in &self.hooks {
            match hook.on_completed(session, insights, scope).await {
                Ok(Some(percentage)) => validation_percentage = Some(percentage),
                Ok(None) => {}
                Err(err) => warn!(
                    session_id = %session.id,
                    hook = err.hook,
                    error = %err,
                    "completion hook failed"
                ),
            }
        }
        validation_percentage
    }
}

impl fmt::Debug for ExplorationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorationDriver")
            .field("store", &self.store)
            .field("catalog", &self.catalog.categories().collect::<Vec<_>>())
            .field("subjects", &self.subjects)
            .field("hooks", &self.hooks.len())
            .field("config", &self.config)
            .finish()
    }
}

fn intro_text(subject: &Subject, total_dimensions: usize) -> String {
    let mut intro = format!("Welcome! Let's explore {} together.", subject.name);
    if let Some(description) = subject
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        intro.push_str(&format!(" Here is what we know so far: {description}"));
    }
    intro.push_str(&format!(
        " We'll go through {total_dimensions} {}, one question at a time.",
        if total_dimensions == 1 {
            "dimension"
        } else {
            "dimensions"
        }
    ));
    intro
}
