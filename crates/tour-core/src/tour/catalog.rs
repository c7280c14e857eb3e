//! Tour definition file DTOs.
//!
//! Tours can be declared in JSON or TOML. Predicates and hooks cannot be
//! expressed in a file; attach them through [`TourRegistry::get_mut`] after loading.

use serde::{Deserialize, Serialize};

use crate::ids::{Location, TourId};
use crate::tour::registry::TourRegistry;
use crate::tour::step::{Placement, TourStep};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourCatalog {
    #[serde(default)]
    pub tours: Vec<TourDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourDefinition {
    pub id: TourId,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub target: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub navigate_to: Option<Location>,
    #[serde(default)]
    pub fallback_target: Option<String>,
}

impl TourCatalog {
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tour catalog JSON: {}", e))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tour catalog TOML: {}", e))
    }

    pub fn into_registry(self) -> TourRegistry {
        let mut registry = TourRegistry::new();
        for tour in self.tours {
            let steps = tour.steps.into_iter().map(TourStep::from).collect();
            if registry.register(tour.id.clone(), steps).is_some() {
                tracing::warn!(tour_id = %tour.id, "duplicate tour definition replaced");
            }
        }
        registry
    }
}

impl From<StepDefinition> for TourStep {
    fn from(definition: StepDefinition) -> Self {
        TourStep {
            target: definition.target,
            title: definition.title,
            content: definition.content,
            placement: definition.placement,
            navigate_to: definition.navigate_to,
            fallback_target: definition.fallback_target,
            ..TourStep::default()
        }
    }
}
