//! Character catalog
//!
//! Read-only reference data loaded once at startup: which characters exist
//! and which role each one plays.

use crate::error::{MatchmakingError, Result};
use crate::types::{CharacterId, CharacterTemplate};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Lookup of character templates by id
#[cfg_attr(test, mockall::automock)]
pub trait CharacterCatalog: Send + Sync {
    /// Template for `id`, `None` if the catalog has no such character
    fn get_character(&self, id: CharacterId) -> Option<CharacterTemplate>;

    /// Every template in catalog order
    fn all_characters(&self) -> Vec<CharacterTemplate>;

    /// Number of templates
    fn character_count(&self) -> usize;
}

/// Catalog backed by a JSON array of `{id, name, role}` records
#[derive(Debug, Clone, Default)]
pub struct CharacterRoster {
    templates: Vec<CharacterTemplate>,
    by_id: HashMap<CharacterId, usize>,
}

impl CharacterRoster {
    /// Build a roster from templates, rejecting duplicate ids
    pub fn from_templates(templates: Vec<CharacterTemplate>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(templates.len());
        for (index, template) in templates.iter().enumerate() {
            if by_id.insert(template.id, index).is_some() {
                return Err(MatchmakingError::ConfigurationError {
                    message: format!("Duplicate character id {}", template.id),
                }
                .into());
            }
        }
        Ok(Self { templates, by_id })
    }

    /// Parse a roster from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let templates: Vec<CharacterTemplate> = serde_json::from_str(json)?;
        Self::from_templates(templates)
    }

    /// Load a roster from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let load_failed = |reason: String| MatchmakingError::CatalogLoadFailed {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let roster = Self::from_json(&contents).map_err(|e| load_failed(e.to_string()))?;

        info!(
            "Character roster ready - {} characters loaded from {}",
            roster.templates.len(),
            path.display()
        );
        Ok(roster)
    }
}

impl CharacterCatalog for CharacterRoster {
    fn get_character(&self, id: CharacterId) -> Option<CharacterTemplate> {
        self.by_id
            .get(&id)
            .map(|&index| self.templates[index].clone())
    }

    fn all_characters(&self) -> Vec<CharacterTemplate> {
        self.templates.clone()
    }

    fn character_count(&self) -> usize {
        self.templates.len()
    }
}
