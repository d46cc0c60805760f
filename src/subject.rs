//! Subjects a session can explore, and how the driver looks them up.
//!
//! The driver never owns a subject. It only keeps a [`SubjectRef`] and asks the
//! [`SubjectRepository`] registered for that [`SubjectType`] whenever it needs
//! the subject's name or attributes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kinds of entities that can be explored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Persona,
    BrandAsset,
    Product,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persona => "persona",
            Self::BrandAsset => "brand_asset",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "persona" => Ok(Self::Persona),
            "brand_asset" => Ok(Self::BrandAsset),
            "product" => Ok(Self::Product),
            other => Err(format!("unknown subject type '{other}'")),
        }
    }
}

/// Polymorphic reference to the thing being explored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRef {
    pub subject_type: SubjectType,
    pub subject_id: String,
}

impl SubjectRef {
    pub fn new(subject_type: SubjectType, subject_id: impl Into<String>) -> Self {
        Self {
            subject_type,
            subject_id: subject_id.into(),
        }
    }
}

/// Snapshot of a subject as returned by its repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub reference: SubjectRef,
    pub name: String,
    pub description: Option<String>,
    /// Free-form attributes handed to the insight generator.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Subject {
    pub fn new(reference: SubjectRef, name: impl Into<String>) -> Self {
        Self {
            reference,
            name: name.into(),
            description: None,
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Explicit request context threaded into every driver call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub workspace_id: String,
    pub caller_id: String,
}

impl Scope {
    pub fn new(workspace_id: impl Into<String>, caller_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            caller_id: caller_id.into(),
        }
    }
}

/// Loads subjects of one type.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Returns `Ok(None)` when the subject does not exist in `scope`.
    async fn fetch_subject(&self, subject_id: &str, scope: &Scope) -> Result<Option<Subject>>;
}

/// Capability table: one repository per subject type.
#[derive(Clone, Default)]
pub struct SubjectRegistry {
    repositories: HashMap<SubjectType, Arc<dyn SubjectRepository>>,
}

impl SubjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, subject_type: SubjectType, repository: Arc<dyn SubjectRepository>) {
        self.repositories.insert(subject_type, repository);
    }

    /// Fetches a subject through its type's repository.
    ///
    /// A subject type without a registered repository behaves like a missing
    /// subject.
    pub async fn fetch(&self, reference: &SubjectRef, scope: &Scope) -> Result<Option<Subject>> {
        match self.repositories.get(&reference.subject_type) {
            Some(repository) => repository.fetch_subject(&reference.subject_id, scope).await,
            None => Ok(None),
        }
    }
}

impl fmt::Debug for SubjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectRegistry")
            .field("types", &self.repositories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_type_round_trips_through_its_name() {
        for subject_type in [SubjectType::Persona, SubjectType::BrandAsset, SubjectType::Product] {
            assert_eq!(subject_type.as_str().parse::<SubjectType>(), Ok(subject_type));
        }
        assert!("campaign".parse::<SubjectType>().is_err());
    }
}
