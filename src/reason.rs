//! Multi-hop reasoning over a [`HoloGraph`].
//!
//! A chain `start -r1-> ? -r2-> ? ...` is resolved one hop at a time: each
//! hop asks the graph for the object of `(current, relation)` and the
//! decoded name becomes the next subject. Only the single best answer per
//! hop is followed; there is no search over alternatives and no
//! backtracking, so noise in an early hop propagates.

use crate::graph::{Answer, HoloGraph};
use crate::vsa::ops::VsaResult;

/// One resolved step of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub subject: String,
    pub relation: String,
    pub answer: Answer,
}

/// Every hop attempted while resolving a chain.
///
/// Stops at the first unresolved hop, so `hops.len()` may be shorter than the
/// relation list.
#[derive(Debug, Clone, PartialEq)]
pub struct HopTrace {
    pub start: String,
    pub hops: Vec<Hop>,
    pub answer: Answer,
}

impl HopTrace {
    /// Whether every hop resolved.
    pub fn is_complete(&self) -> bool {
        self.answer.is_known()
    }
}

impl std::fmt::Display for HopTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)?;
        for hop in &self.hops {
            write!(f, " -{}-> {}", hop.relation, hop.answer)?;
        }
        Ok(())
    }
}

/// Chains single-hop queries into multi-hop answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReasoningEngine;

impl ReasoningEngine {
    pub fn new() -> Self {
        Self
    }

    /// Follow `relations` from `start`, returning the final answer.
    ///
    /// Any unresolved hop makes the whole chain [`Answer::Unknown`].
    pub fn multi_hop(
        &self,
        graph: &mut HoloGraph,
        start: &str,
        relations: &[&str],
    ) -> VsaResult<Answer> {
        self.multi_hop_trace(graph, start, relations)
            .map(|trace| trace.answer)
    }

    /// Like [`multi_hop`](Self::multi_hop), keeping each intermediate hop.
    ///
    /// With no relations the chain is just its start: `Known` with
    /// similarity 1.0 if `start` is a defined concept.
    pub fn multi_hop_trace(
        &self,
        graph: &mut HoloGraph,
        start: &str,
        relations: &[&str],
    ) -> VsaResult<HopTrace> {
        let mut hops = Vec::with_capacity(relations.len());

        if relations.is_empty() {
            let answer = if graph.memory().contains(start) {
                Answer::Known {
                    name: start.to_string(),
                    similarity: 1.0,
                }
            } else {
                Answer::Unknown
            };
            return Ok(HopTrace {
                start: start.to_string(),
                hops,
                answer,
            });
        }

        let mut current = start.to_string();
        let mut answer = Answer::Unknown;
        for (depth, &relation) in relations.iter().enumerate() {
            answer = graph.ask(&current, relation)?;
            hops.push(Hop {
                subject: current.clone(),
                relation: relation.to_string(),
                answer: answer.clone(),
            });

            match &answer {
                Answer::Known { name, similarity } => {
                    tracing::debug!(depth, subject = %current, relation, object = %name, similarity, "hop resolved");
                    current = name.clone();
                }
                Answer::Unknown => {
                    tracing::warn!(depth, subject = %current, relation, start, "hop unresolved, chain abandoned");
                    break;
                }
            }
        }

        Ok(HopTrace {
            start: start.to_string(),
            hops,
            answer,
        })
    }
}
