//! Event catalogue - the validated, immutable set of authored definitions.
//!
//! Malformed definitions are logged and excluded at load time; the rest of
//! the engine only ever sees valid ones.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use lastlight_domain::{DomainError, EventDefinition, EventDefinitionRecord, EventEffect, EventId};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("Failed to read catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document itself is not a JSON array of records.
    #[error("Catalogue is not a list of event definitions: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A definition excluded at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedDefinition {
    pub event_id: Option<EventId>,
    pub error: DomainError,
}

#[derive(Debug, Default)]
pub struct EventCatalogue {
    definitions: Vec<EventDefinition>,
    index: HashMap<EventId, usize>,
    rejected: Vec<RejectedDefinition>,
}

impl EventCatalogue {
    /// Validate and index authored records, keeping authoring order.
    pub fn load(records: Vec<EventDefinitionRecord>) -> Self {
        let mut catalogue = Self::default();
        let mut accepted: Vec<EventDefinition> = Vec::with_capacity(records.len());
        let mut seen = HashSet::new();

        for record in records {
            let id = record.id.clone();
            if !seen.insert(id.clone()) {
                catalogue.reject(
                    Some(id.clone()),
                    DomainError::authoring(id.as_str(), "duplicate event id"),
                );
                continue;
            }
            match EventDefinition::try_from(record) {
                Ok(definition) => accepted.push(definition),
                Err(error) => catalogue.reject(Some(id), error),
            }
        }

        // Dropping a definition can orphan follow-ups that point at it.
        loop {
            let known: Vec<EventId> = accepted.iter().map(|d| d.id().clone()).collect();
            let orphan = accepted.iter().position(|d| {
                d.follow_up()
                    .is_some_and(|f| !known.contains(&f.event_id))
            });
            let Some(position) = orphan else { break };
            let definition = accepted.remove(position);
            let target = definition
                .follow_up()
                .map(|f| f.event_id.to_string())
                .unwrap_or_default();
            catalogue.reject(
                Some(definition.id().clone()),
                DomainError::authoring(
                    definition.id().as_str(),
                    format!("follow-up '{}' is not in the catalogue", target),
                ),
            );
        }

        for definition in accepted {
            catalogue
                .index
                .insert(definition.id().clone(), catalogue.definitions.len());
            catalogue.definitions.push(definition);
        }

        tracing::info!(
            loaded = catalogue.definitions.len(),
            rejected = catalogue.rejected.len(),
            quests = catalogue.quests().count(),
            "Loaded event catalogue"
        );
        catalogue
    }

    /// Parse a JSON array of records. Entries that fail to deserialize are
    /// rejected individually; only a malformed document is an error.
    ///
    /// An effect with a malformed payload becomes [`EventEffect::Unsupported`]
    /// instead of taking its whole definition down.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogueError> {
        let entries: Vec<Value> = serde_json::from_str(json)?;
        let mut records = Vec::with_capacity(entries.len());
        let mut unreadable = Vec::new();

        for (position, mut entry) in entries.into_iter().enumerate() {
            let event_id = entry
                .get("id")
                .and_then(|v| v.as_str())
                .map(EventId::new);
            let label = event_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("#{}", position));

            downgrade_malformed_effects(entry.get_mut("effects"), &label);
            if let Some(Value::Array(choices)) = entry.get_mut("choices") {
                for choice in choices {
                    downgrade_malformed_effects(choice.get_mut("effects"), &label);
                }
            }

            match serde_json::from_value::<EventDefinitionRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => {
                    unreadable.push(RejectedDefinition {
                        event_id,
                        error: DomainError::authoring(label, e.to_string()),
                    });
                }
            }
        }

        let mut catalogue = Self::load(records);
        for rejected in unreadable {
            tracing::warn!(
                event_id = ?rejected.event_id,
                error = %rejected.error,
                "Excluding unreadable event definition"
            );
            catalogue.rejected.push(rejected);
        }
        Ok(catalogue)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    fn reject(&mut self, event_id: Option<EventId>, error: DomainError) {
        tracing::warn!(
            event_id = ?event_id,
            error = %error,
            "Excluding malformed event definition"
        );
        self.rejected.push(RejectedDefinition { event_id, error });
    }

    pub fn get(&self, id: &EventId) -> Option<&EventDefinition> {
        self.index.get(id).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.index.contains_key(id)
    }

    /// Authoring position, used as the stable tie-break within a priority.
    pub fn position(&self, id: &EventId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All definitions in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.definitions.iter()
    }

    pub fn quests(&self) -> impl Iterator<Item = &EventDefinition> {
        self.definitions.iter().filter(|d| d.is_quest())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn rejected(&self) -> &[RejectedDefinition] {
        &self.rejected
    }
}

fn downgrade_malformed_effects(effects: Option<&mut Value>, label: &str) {
    let Some(Value::Array(effects)) = effects else {
        return;
    };
    for effect in effects.iter_mut() {
        if let Err(e) = serde_json::from_value::<EventEffect>(effect.clone()) {
            tracing::warn!(
                event_id = %label,
                effect_type = ?effect.get("type").and_then(|t| t.as_str()),
                error = %e,
                "Treating malformed effect as unsupported"
            );
            *effect = serde_json::json!({ "type": "unsupported" });
        }
    }
}
