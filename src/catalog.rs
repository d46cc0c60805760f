//! Ordered dimension lists per subject category.
//!
//! A catalog is loaded once per process and never mutated afterwards, so a
//! single instance can be shared by every session through an `Arc`.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ExplorationError, Result};

/// One topic of a guided exploration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Stable identifier, unique within a category.
    pub key: String,
    pub title: String,
    /// Prompt shown to the user when this dimension is asked.
    pub question: String,
}

impl Dimension {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            question: question.into(),
        }
    }
}

/// Errors raised while building a catalog from configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("category '{0}' has no dimensions")]
    EmptyCategory(String),

    #[error("category '{category}' repeats dimension key '{key}'")]
    DuplicateKey { category: String, key: String },

    #[error("category '{0}' is defined more than once")]
    DuplicateCategory(String),
}

/// Maps a subject category to its ordered list of dimensions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimensionCatalog {
    categories: BTreeMap<String, Vec<Dimension>>,
}

impl DimensionCatalog {
    /// An empty catalog; every lookup fails until categories are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a category.
    ///
    /// # Errors
    ///
    /// Fails if `dimensions` is empty or repeats a key.
    pub fn with_category(
        mut self,
        category: impl AsRef<str>,
        dimensions: Vec<Dimension>,
    ) -> std::result::Result<Self, CatalogError> {
        let category = normalize(category.as_ref());
        validate(&category, &dimensions)?;
        self.categories.insert(category, dimensions);
        Ok(self)
    }

    /// Parses a workspace-level catalog document.
    ///
    /// The document is a JSON object keyed by category whose values are
    /// ordered arrays of `{ "key", "title", "question" }` objects. Names that
    /// normalise to the same category (`"Persona"` and `"persona"`) are rejected.
    ///
    /// ```
    /// use branddock_exploration::DimensionCatalog;
    ///
    /// let catalog = DimensionCatalog::from_json(r#"{
    ///     "persona": [
    ///         { "key": "demographics", "title": "Demographics", "question": "Who are they?" },
    ///         { "key": "goals", "title": "Goals", "question": "What do they want?" }
    ///     ]
    /// }"#).unwrap();
    ///
    /// assert_eq!(catalog.resolve("persona").unwrap().len(), 2);
    /// ```
    pub fn from_json(document: &str) -> std::result::Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<Dimension>> = serde_json::from_str(document)?;
        raw.into_iter()
            .try_fold(Self::new(), |catalog, (category, dimensions)| {
                if catalog.categories.contains_key(&normalize(&category)) {
                    return Err(CatalogError::DuplicateCategory(category));
                }
                catalog.with_category(category, dimensions)
            })
    }

    /// Overlays `other` on top of `self`; categories in `other` win.
    pub fn merged(mut self, other: DimensionCatalog) -> Self {
        self.categories.extend(other.categories);
        self
    }

    /// Returns the ordered dimensions for `category`.
    ///
    /// Category names are matched case-insensitively and `-` is treated as
    /// `_`, so `"Brand-Promise"` resolves the `brand_promise` category.
    pub fn resolve(&self, category: &str) -> Result<&[Dimension]> {
        self.categories
            .get(&normalize(category))
            .map(Vec::as_slice)
            .ok_or_else(|| ExplorationError::UnsupportedCategory(category.to_string()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// The categories shipped with Branddock.
    pub fn builtin() -> Self {
        let categories = [
            ("persona", persona()),
            ("purpose_statement", purpose_statement()),
            ("brand_promise", brand_promise()),
            ("product", product()),
        ];
        Self {
            categories: categories
                .into_iter()
                .map(|(name, dimensions)| (name.to_string(), dimensions))
                .collect(),
        }
    }
}

fn normalize(category: &str) -> String {
    category.trim().to_ascii_lowercase().replace('-', "_")
}

fn validate(category: &str, dimensions: &[Dimension]) -> std::result::Result<(), CatalogError> {
    if dimensions.is_empty() {
        return Err(CatalogError::EmptyCategory(category.to_string()));
    }
    let mut seen = HashSet::new();
    for dimension in dimensions {
        if !seen.insert(dimension.key.as_str()) {
            return Err(CatalogError::DuplicateKey {
                category: category.to_string(),
                key: dimension.key.clone(),
            });
        }
    }
    Ok(())
}

fn persona() -> Vec<Dimension> {
    vec![
        Dimension::new(
            "demographics",
            "Demographics",
            "Let's start with the basics. Who is this persona? Describe their age range, \
             location, occupation and life stage.",
        ),
        Dimension::new(
            "goals_motivations",
            "Goals & Motivations",
            "What is this persona trying to achieve, and what drives them when they make decisions?",
        ),
        Dimension::new(
            "challenges_frustrations",
            "Challenges & Frustrations",
            "What stands in their way? Which problems or frustrations come up again and again?",
        ),
        Dimension::new(
            "value_proposition",
            "Value Proposition",
            "How does your brand help this persona? Why would they choose you over the alternatives?",
        ),
    ]
}

fn purpose_statement() -> Vec<Dimension> {
    vec![
        Dimension::new(
            "origin",
            "Origin",
            "Why was the company founded? Describe the moment or problem that started it.",
        ),
        Dimension::new(
            "impact",
            "Impact",
            "What change does the brand want to see in the world if it succeeds?",
        ),
        Dimension::new(
            "beneficiaries",
            "Beneficiaries",
            "Who benefits most from that change, and how would their lives be different?",
        ),
    ]
}

fn brand_promise() -> Vec<Dimension> {
    vec![
        Dimension::new(
            "core_promise",
            "Core Promise",
            "In one sentence, what does the brand promise every customer, every time?",
        ),
        Dimension::new(
            "proof_points",
            "Proof Points",
            "Which products, behaviours or results prove that the promise is kept?",
        ),
        Dimension::new(
            "boundaries",
            "Boundaries",
            "What will the brand never do, even if it would help in the short term?",
        ),
    ]
}

fn product() -> Vec<Dimension> {
    vec![
        Dimension::new(
            "problem",
            "Problem",
            "Which customer problem does this product solve?",
        ),
        Dimension::new(
            "audience",
            "Audience",
            "Who is the product for, and who is it explicitly not for?",
        ),
        Dimension::new(
            "differentiation",
            "Differentiation",
            "What makes this product different from what customers use today?",
        ),
    ]
}
