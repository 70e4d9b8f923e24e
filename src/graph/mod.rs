//! HoloGraph: a knowledge store that keeps every learned fact in one hologram.
//!
//! Facts are (subject, relation, object) triples of named concepts. Each fact
//! is encoded by the [`RelationBinder`] and superposed into a single vector by
//! the [`WeightedBundler`]; queries unbind the hologram and clean the noisy
//! estimate up against the [`CleanupMemory`].
//!
//! - **Write path** (`learn`): define concepts, encode, record. O(1) amortized
//!   apart from prototype generation. The hologram is only marked dirty.
//! - **Read path** (`ask`): rebuild the hologram if dirty, unbind, decode.
//!
//! Recall is approximate: each additional fact adds cross-talk noise.

pub mod binder;
pub mod shared;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::HoloConfig;
use crate::error::HoloResult;
use crate::simd;
use crate::vsa::bundler::{EntryId, MAX_ENTRY_WEIGHT, WeightedBundler};
use crate::vsa::cleanup::CleanupMemory;
use crate::vsa::ops::{VsaOps, VsaResult};
use crate::vsa::{Dimension, HyperVector};

pub use binder::RelationBinder;

/// Text shown for an unresolved answer.
pub const UNKNOWN: &str = "???";

/// Result of asking the graph a question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// A concept cleared the decode threshold.
    Known {
        /// The decoded concept name.
        name: String,
        /// Similarity between the unbound query and the concept's prototype.
        similarity: f32,
    },
    /// No confident match.
    Unknown,
}

impl Answer {
    /// Whether the answer resolved to a concept.
    pub fn is_known(&self) -> bool {
        matches!(self, Answer::Known { .. })
    }

    /// The decoded name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Answer::Known { name, .. } => Some(name),
            Answer::Unknown => None,
        }
    }

    /// Similarity of the decoded concept, if any.
    pub fn similarity(&self) -> Option<f32> {
        match self {
            Answer::Known { similarity, .. } => Some(*similarity),
            Answer::Unknown => None,
        }
    }

    /// The decoded name, or [`UNKNOWN`].
    pub fn as_str(&self) -> &str {
        self.name().unwrap_or(UNKNOWN)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learned fact as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fact {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Fact {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} -{}-> {})", self.subject, self.relation, self.object)
    }
}

/// Summary statistics for a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct HoloStats {
    pub dimension: usize,
    pub isa_level: String,
    pub concept_count: usize,
    pub fact_count: usize,
    pub total_weight: u64,
    pub hologram_density: f32,
}

impl std::fmt::Display for HoloStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "holokg graph info")?;
        writeln!(f, "  dimension:    {}", self.dimension)?;
        writeln!(f, "  kernel:       {}", self.isa_level)?;
        writeln!(f, "  concepts:     {}", self.concept_count)?;
        writeln!(f, "  facts:        {}", self.fact_count)?;
        writeln!(f, "  total weight: {}", self.total_weight)?;
        writeln!(f, "  density:      {:.4}", self.hologram_density)?;
        Ok(())
    }
}

/// Concept registry + hologram of learned facts.
///
/// Not internally synchronized: `ask` takes `&mut self` because it may
/// rebuild the cached hologram. Use [`shared::SharedHoloGraph`] to share one
/// graph between threads.
#[derive(Clone)]
pub struct HoloGraph {
    config: HoloConfig,
    ops: Arc<VsaOps>,
    memory: CleanupMemory,
    binder: RelationBinder,
    bundler: WeightedBundler,
    facts: Vec<Fact>,
    fact_index: HashMap<Fact, EntryId>,
}

impl HoloGraph {
    /// Create an empty graph with the given configuration.
    pub fn new(config: HoloConfig) -> HoloResult<Self> {
        config.validate()?;
        let dim = config.dim();
        let kernel = simd::best_kernel();
        tracing::info!(
            isa = %kernel.isa_level(),
            dim = dim.0,
            threshold = config.ask_threshold,
            "initializing holograph"
        );
        Ok(Self {
            ops: Arc::new(VsaOps::new(kernel, dim)),
            memory: CleanupMemory::new(dim),
            binder: RelationBinder::default(),
            bundler: WeightedBundler::new(dim, config.bundle_seed),
            facts: Vec::new(),
            fact_index: HashMap::new(),
            config,
        })
    }

    /// Create an empty graph with default settings at the given dimension.
    pub fn with_dimension(dim: Dimension) -> HoloResult<Self> {
        Self::new(HoloConfig {
            dimension: dim.0,
            ..Default::default()
        })
    }

    /// Define a concept (idempotent, first definition wins).
    pub fn define(&mut self, name: &str) -> VsaResult<HyperVector> {
        self.memory.define(&self.ops, name)
    }

    /// Learn `subject -relation-> object`.
    ///
    /// Defines any new concepts. Learning the same triple again adds one to
    /// its weight, making it more robust against later cross-talk.
    pub fn learn(&mut self, subject: &str, relation: &str, object: &str) -> VsaResult<()> {
        self.learn_weighted(Fact::new(subject, relation, object), 1)
    }

    /// Learn `fact` as if it had been learned `weight` times.
    ///
    /// A zero weight is ignored. The accumulated weight is capped at
    /// [`MAX_ENTRY_WEIGHT`].
    pub fn learn_weighted(&mut self, fact: Fact, weight: u32) -> VsaResult<()> {
        if weight == 0 {
            return Ok(());
        }
        if weight > MAX_ENTRY_WEIGHT {
            tracing::warn!(%fact, weight, max = MAX_ENTRY_WEIGHT, "fact weight clamped");
        }
        if let Some(&id) = self.fact_index.get(&fact) {
            self.bundler.reinforce(id, weight);
            tracing::debug!(%fact, weight = ?self.bundler.weight(id), "reinforced fact");
            return Ok(());
        }

        let s = self.memory.define(&self.ops, &fact.subject)?;
        let r = self.memory.define(&self.ops, &fact.relation)?;
        let o = self.memory.define(&self.ops, &fact.object)?;
        let encoded = self.binder.encode_fact(&self.ops, &s, &r, &o)?;

        let id = self.bundler.add(encoded, weight)?;
        tracing::debug!(%fact, weight, "learned fact");
        self.fact_index.insert(fact.clone(), id);
        self.facts.push(fact);
        Ok(())
    }

    /// Ask for the object of `subject -relation-> ?`.
    ///
    /// Returns [`Answer::Unknown`] if either concept was never defined (asking
    /// never defines concepts) or if no prototype clears the threshold.
    pub fn ask(&mut self, subject: &str, relation: &str) -> VsaResult<Answer> {
        let Some(query) = self.query_vector(subject, relation)? else {
            tracing::debug!(subject, relation, "ask on undefined concept");
            return Ok(Answer::Unknown);
        };

        let answer = match self
            .memory
            .decode(&self.ops, &query, self.config.ask_threshold)?
        {
            Some(hit) => Answer::Known {
                name: hit.name,
                similarity: hit.similarity,
            },
            None => Answer::Unknown,
        };
        tracing::debug!(subject, relation, %answer, "ask");
        Ok(answer)
    }

    /// Similarity between the unbound `(subject, relation)` query and the
    /// prototype of `object`.
    ///
    /// `None` if any of the three concepts is undefined. Useful for judging
    /// how strongly a fact still resonates in the hologram.
    pub fn resonance(
        &mut self,
        subject: &str,
        relation: &str,
        object: &str,
    ) -> VsaResult<Option<f32>> {
        let Some(query) = self.query_vector(subject, relation)? else {
            return Ok(None);
        };
        match self.memory.get(object) {
            Some(proto) => Ok(Some(self.ops.similarity(&query, proto)?)),
            None => Ok(None),
        }
    }

    fn query_vector(&mut self, subject: &str, relation: &str) -> VsaResult<Option<HyperVector>> {
        let (Some(s), Some(r)) = (self.memory.get(subject), self.memory.get(relation)) else {
            return Ok(None);
        };
        let hologram = self.bundler.build(&self.ops)?;
        self.binder.query(&self.ops, hologram, s, r).map(Some)
    }

    /// The current hologram, rebuilt first if stale.
    pub fn hologram(&mut self) -> VsaResult<&HyperVector> {
        self.bundler.build(&self.ops)
    }

    /// Number of distinct learned facts.
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of defined concepts.
    pub fn concept_count(&self) -> usize {
        self.memory.len()
    }

    /// Learned facts with their accumulated weights, in learning order.
    pub fn facts(&self) -> impl Iterator<Item = (&Fact, u32)> {
        self.facts.iter().map(|fact| {
            let weight = self
                .fact_index
                .get(fact)
                .and_then(|&id| self.bundler.weight(id))
                .unwrap_or(0);
            (fact, weight)
        })
    }

    /// Summary statistics. Rebuilds the hologram if needed.
    pub fn stats(&mut self) -> VsaResult<HoloStats> {
        let density = self.bundler.build(&self.ops)?.density();
        Ok(HoloStats {
            dimension: self.config.dimension,
            isa_level: self.ops.isa_level().to_string(),
            concept_count: self.memory.len(),
            fact_count: self.facts.len(),
            total_weight: self.bundler.total_weight(),
            hologram_density: density,
        })
    }

    /// The concept registry.
    pub fn memory(&self) -> &CleanupMemory {
        &self.memory
    }

    pub(crate) fn memory_mut(&mut self) -> &mut CleanupMemory {
        &mut self.memory
    }

    /// The VSA operations handle.
    pub fn ops(&self) -> &VsaOps {
        &self.ops
    }

    /// The graph configuration.
    pub fn config(&self) -> &HoloConfig {
        &self.config
    }
}

impl std::fmt::Debug for HoloGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoloGraph")
            .field("config", &self.config)
            .field("concepts", &self.memory.len())
            .field("facts", &self.facts.len())
            .field("dirty", &self.bundler.is_dirty())
            .finish()
    }
}
