// Constitution data model
//
// A constitution is an ordered, named collection of behavioral principles.
// The critique loop evaluates responses against each enabled principle in
// declaration order, so principle order is significant.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

pub mod library;

/// Category a principle belongs to.
///
/// This is a closed set: constitutions carrying an unknown category fail at
/// deserialization, before the critique loop ever sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipleCategory {
    Safety,
    Honesty,
    Helpfulness,
    Ethics,
    Custom,
}

/// A bad/good response pair illustrating a principle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleExample {
    pub bad: String,
    pub good: String,
}

/// A single behavioral principle in a constitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: PrincipleCategory,
    /// Question posed to the critic model when evaluating a response.
    pub critique_instruction: String,
    /// Guidance handed to the reviser when this principle is triggered.
    pub revision_instruction: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub examples: Vec<PrincipleExample>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

impl Principle {
    /// Create a custom principle with a generated id.
    pub fn custom(
        name: impl Into<String>,
        description: impl Into<String>,
        critique_instruction: impl Into<String>,
        revision_instruction: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            category: PrincipleCategory::Custom,
            critique_instruction: critique_instruction.into(),
            revision_instruction: revision_instruction.into(),
            weight: 1.0,
            enabled: true,
            examples: Vec::new(),
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: PrincipleCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// An ordered collection of principles used as evaluation criteria for one
/// critique run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constitution {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub principles: Vec<Principle>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_author() -> String {
    "anonymous".to_string()
}

impl Constitution {
    /// Create an empty constitution with a generated id.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            principles: Vec::new(),
            version: default_version(),
            author: default_author(),
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
            is_public: false,
            metadata: HashMap::new(),
        }
    }

    /// Enabled principles, in declaration order.
    pub fn enabled_principles(&self) -> Vec<&Principle> {
        self.principles.iter().filter(|p| p.enabled).collect()
    }

    /// Principles in a given category, in declaration order.
    pub fn principles_by_category(&self, category: PrincipleCategory) -> Vec<&Principle> {
        self.principles
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Look up a principle by id.
    pub fn principle(&self, principle_id: &str) -> Option<&Principle> {
        self.principles.iter().find(|p| p.id == principle_id)
    }

    /// Append a principle. Fails if a principle with the same id exists.
    pub fn add_principle(&mut self, principle: Principle) -> Result<()> {
        if self.principle(&principle.id).is_some() {
            bail!("Principle with id '{}' already exists", principle.id);
        }
        self.principles.push(principle);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a principle by id. Returns true if a principle was removed.
    pub fn remove_principle(&mut self, principle_id: &str) -> bool {
        match self.principles.iter().position(|p| p.id == principle_id) {
            Some(idx) => {
                self.principles.remove(idx);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Reorder principles according to the given id list.
    ///
    /// Ids in the list that match no principle are skipped; principles
    /// absent from the list are dropped.
    pub fn reorder_principles(&mut self, principle_ids: &[String]) {
        let mut by_id: HashMap<String, Principle> = self
            .principles
            .drain(..)
            .map(|p| (p.id.clone(), p))
            .collect();
        self.principles = principle_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        self.updated_at = Utc::now();
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize constitution")
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse constitution")
    }

    /// Load a constitution from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read constitution file {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Save the constitution to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write constitution file {}", path.display()))
    }
}
