#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use branddock_exploration::migration::{Migrator, MigratorTrait};
use branddock_exploration::{
    CompletionHook, CompletionHookError, Dimension, DimensionCatalog, DriverConfig,
    ExplorationDriver, GenerationError, InsightGenerator, InsightRequest, InsightsData, Scope,
    Session, SessionStore, Subject, SubjectRef, SubjectRepository, SubjectType,
    TemplateInsightGenerator,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fresh, migrated in-memory database.
pub async fn connect() -> DatabaseConnection {
    init_tracing();
    // One pooled connection, otherwise every connection sees its own empty database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(opt).await.expect("connect to sqlite");
    Migrator::up(&conn, None).await.expect("run migrations");
    conn
}

pub fn scope() -> Scope {
    Scope::new("ws-1", "user-1")
}

pub fn persona_ref() -> SubjectRef {
    SubjectRef::new(SubjectType::Persona, "p1")
}

/// Two-dimension persona catalog used by most tests.
pub fn two_dimension_catalog() -> DimensionCatalog {
    DimensionCatalog::new()
        .with_category(
            "persona",
            vec![
                Dimension::new("demographics", "Demographics", "Who is this persona?"),
                Dimension::new("goals", "Goals", "What does this persona want to achieve?"),
            ],
        )
        .expect("valid catalog")
}

#[derive(Default)]
pub struct InMemorySubjects {
    subjects: HashMap<(String, String), Subject>,
}

impl InMemorySubjects {
    pub fn with(mut self, workspace_id: &str, subject: Subject) -> Self {
        self.subjects.insert(
            (workspace_id.to_string(), subject.reference.subject_id.clone()),
            subject,
        );
        self
    }
}

#[async_trait]
impl SubjectRepository for InMemorySubjects {
    async fn fetch_subject(
        &self,
        subject_id: &str,
        scope: &Scope,
    ) -> branddock_exploration::Result<Option<Subject>> {
        Ok(self
            .subjects
            .get(&(scope.workspace_id.clone(), subject_id.to_string()))
            .cloned())
    }
}

pub fn personas() -> Arc<InMemorySubjects> {
    Arc::new(
        InMemorySubjects::default().with(
            "ws-1",
            Subject::new(persona_ref(), "Urban Ulla")
                .with_description("Young professional living in a big city."),
        ),
    )
}

/// Feedback always fails; insights come from the template generator.
pub struct FailingFeedback {
    pub calls: AtomicUsize,
}

impl FailingFeedback {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl InsightGenerator for FailingFeedback {
    async fn feedback(&self, _: &Dimension, _: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Service("model overloaded".into()))
    }

    async fn insights(&self, request: InsightRequest<'_>) -> Result<InsightsData, GenerationError> {
        TemplateInsightGenerator::new().insights(request).await
    }
}

/// Every call takes longer than any reasonable test timeout.
pub struct SlowGenerator(pub Duration);

#[async_trait]
impl InsightGenerator for SlowGenerator {
    async fn feedback(&self, dimension: &Dimension, _: &str) -> Result<String, GenerationError> {
        tokio::time::sleep(self.0).await;
        Ok(format!("late feedback on {}", dimension.title))
    }

    async fn insights(&self, _: InsightRequest<'_>) -> Result<InsightsData, GenerationError> {
        tokio::time::sleep(self.0).await;
        Err(GenerationError::Service("unreachable".into()))
    }
}

/// Feedback works, insights fail.
pub struct FailingInsights;

#[async_trait]
impl InsightGenerator for FailingInsights {
    async fn feedback(&self, dimension: &Dimension, answer: &str) -> Result<String, GenerationError> {
        TemplateInsightGenerator::new().feedback(dimension, answer).await
    }

    async fn insights(&self, _: InsightRequest<'_>) -> Result<InsightsData, GenerationError> {
        Err(GenerationError::InvalidResponse("not json".into()))
    }
}

/// Reports a fixed validation percentage and counts its calls.
pub struct RecordingHook {
    pub percentage: Option<u8>,
    pub calls: AtomicUsize,
}

impl RecordingHook {
    pub fn new(percentage: Option<u8>) -> Self {
        Self {
            percentage,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionHook for RecordingHook {
    async fn on_completed(
        &self,
        session: &Session,
        _: &InsightsData,
        _: &Scope,
    ) -> Result<Option<u8>, CompletionHookError> {
        assert!(session.is_completed());
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.percentage)
    }
}

pub struct FailingHook;

#[async_trait]
impl CompletionHook for FailingHook {
    async fn on_completed(
        &self,
        _: &Session,
        _: &InsightsData,
        _: &Scope,
    ) -> Result<Option<u8>, CompletionHookError> {
        Err(CompletionHookError {
            hook: "research_method",
            message: "validation service down".into(),
        })
    }
}

pub fn driver_with(conn: DatabaseConnection, generator: Arc<dyn InsightGenerator>) -> ExplorationDriver {
    ExplorationDriver::new(SessionStore::new(conn), generator)
        .with_catalog(two_dimension_catalog())
        .with_subject_repository(SubjectType::Persona, personas())
        .with_config(DriverConfig::default().with_generation_timeout(Duration::from_secs(5)))
}

pub async fn driver() -> ExplorationDriver {
    driver_with(connect().await, Arc::new(TemplateInsightGenerator::new()))
}
