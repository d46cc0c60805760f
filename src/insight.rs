//! Feedback and insight generation.
//!
//! The driver talks to an [`InsightGenerator`] and never to a language-model
//! vendor directly. [`TemplateInsightGenerator`] is a deterministic
//! implementation used when no model is configured and in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::Dimension;
use crate::entity::MessageType;
use crate::error::GenerationError;
use crate::subject::Subject;
use crate::transcript::Message;

/// Summary of one explored dimension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionInsight {
    pub dimension_key: String,
    pub dimension_title: String,
    pub summary: String,
}

/// Structured result written to a session when it completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsData {
    pub executive_summary: String,
    pub dimensions: Vec<DimensionInsight>,
    /// Percentage points this exploration adds to the subject's research score.
    pub research_boost: u8,
}

/// Everything a generator sees when summarising a session.
#[derive(Clone, Copy, Debug)]
pub struct InsightRequest<'a> {
    pub subject: &'a Subject,
    pub dimensions: &'a [Dimension],
    pub transcript: &'a [Message],
}

impl<'a> InsightRequest<'a> {
    /// Answers recorded for `dimension_key`, in transcript order.
    pub fn answers_for<'k>(&self, dimension_key: &'k str) -> impl Iterator<Item = &'a str> + 'k
    where
        'a: 'k,
    {
        self.transcript
            .iter()
            .filter(move |message| {
                message.message_type == MessageType::UserAnswer
                    && message.metadata.dimension_key.as_deref() == Some(dimension_key)
            })
            .map(|message| message.content.as_str())
    }
}

/// Produces per-answer feedback and end-of-session insights.
///
/// Implementations may call an external service. The driver bounds every call
/// with [`DriverConfig::generation_timeout`](crate::DriverConfig).
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Short reaction to one answer.
    async fn feedback(&self, dimension: &Dimension, answer: &str)
        -> Result<String, GenerationError>;

    /// Structured summary of a whole transcript.
    async fn insights(&self, request: InsightRequest<'_>) -> Result<InsightsData, GenerationError>;
}

/// Acknowledgement used when feedback generation fails.
pub fn fallback_feedback(dimension: &Dimension) -> String {
    format!(
        "Thank you for sharing your thoughts on {}. Your answer has been recorded.",
        dimension.title
    )
}

const EXCERPT_CHARS: usize = 140;

/// Deterministic generator built from string templates.
#[derive(Clone, Debug)]
pub struct TemplateInsightGenerator {
    research_boost: u8,
}

impl Default for TemplateInsightGenerator {
    fn default() -> Self {
        Self { research_boost: 15 }
    }
}

impl TemplateInsightGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_research_boost(mut self, research_boost: u8) -> Self {
        self.research_boost = research_boost.min(100);
        self
    }
}

#[async_trait]
impl InsightGenerator for TemplateInsightGenerator {
    async fn feedback(
        &self,
        dimension: &Dimension,
        answer: &str,
    ) -> Result<String, GenerationError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(fallback_feedback(dimension));
        }
        Ok(format!(
            "Great insight on {}. Noted: \"{}\".",
            dimension.title,
            excerpt(answer)
        ))
    }

    async fn insights(&self, request: InsightRequest<'_>) -> Result<InsightsData, GenerationError> {
        let dimensions: Vec<DimensionInsight> = request
            .dimensions
            .iter()
            .map(|dimension| {
                let answers: Vec<&str> = request.answers_for(&dimension.key).collect();
                let summary = if answers.is_empty() {
                    "Not explored yet.".to_string()
                } else {
                    answers.join(" ")
                };
                DimensionInsight {
                    dimension_key: dimension.key.clone(),
                    dimension_title: dimension.title.clone(),
                    summary,
                }
            })
            .collect();

        let explored = request
            .dimensions
            .iter()
            .filter(|dimension| request.answers_for(&dimension.key).next().is_some())
            .count();

        Ok(InsightsData {
            executive_summary: format!(
                "{} was explored across {} of {} dimensions.",
                request.subject.name,
                explored,
                dimensions.len()
            ),
            dimensions,
            research_boost: self.research_boost,
        })
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
