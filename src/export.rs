//! Export types for serializing graph state.
//!
//! These are human-readable views of the registry and ledger for JSON
//! export. [`FactExport`] doubles as the input format of `holokg ingest`.

use serde::{Deserialize, Serialize};

use crate::graph::HoloGraph;

/// Exported concept summary. Prototypes are regenerable from the name, so
/// only their bit counts are included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptExport {
    pub name: String,
    /// Number of set components in the prototype.
    pub ones: u32,
}

/// Exported ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactExport {
    pub subject: String,
    pub relation: String,
    pub object: String,
    /// Accumulated weight. Defaults to 1 when ingesting.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Full graph export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub dimension: usize,
    pub concepts: Vec<ConceptExport>,
    pub facts: Vec<FactExport>,
}

impl HoloGraph {
    /// Concepts in definition order.
    pub fn export_concepts(&self) -> Vec<ConceptExport> {
        self.memory()
            .iter()
            .map(|(name, vec)| ConceptExport {
                name: name.to_string(),
                ones: vec.count_ones(),
            })
            .collect()
    }

    /// Ledger entries in learning order.
    pub fn export_facts(&self) -> Vec<FactExport> {
        self.facts()
            .map(|(fact, weight)| FactExport {
                subject: fact.subject.clone(),
                relation: fact.relation.clone(),
                object: fact.object.clone(),
                weight,
            })
            .collect()
    }

    pub fn export(&self) -> GraphExport {
        GraphExport {
            dimension: self.config().dimension,
            concepts: self.export_concepts(),
            facts: self.export_facts(),
        }
    }
}
