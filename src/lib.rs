// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # holokg
//!
//! A holographic knowledge graph built on a Vector Symbolic Architecture
//! (hyperdimensional computing). Concepts are pseudo-random 10,000-bit
//! vectors; facts are bound together with XOR and permutation and
//! superposed into a single hologram that answers approximate queries.
//!
//! ## Architecture
//!
//! - **VSA core** (`vsa`): hypervectors, the bind/bundle/permute algebra,
//!   cleanup memory and the weighted bundler
//! - **SIMD acceleration** (`simd`): runtime-dispatched AVX2/generic kernels
//! - **Knowledge store** (`graph`): relation binder and the [`HoloGraph`](graph::HoloGraph)
//! - **Reasoning** (`reason`): multi-hop chains over single-hop queries
//! - **Temporal buffer** (`temporal`): decay-weighted streaming resonance
//! - **Persistence** (`store`): registry and fact ledger in redb
//!
//! ## Library usage
//!
//! ```no_run
//! use holokg::graph::HoloGraph;
//! use holokg::reason::ReasoningEngine;
//! use holokg::vsa::Dimension;
//!
//! let mut graph = HoloGraph::with_dimension(Dimension::DEFAULT).unwrap();
//! graph.learn("Fraymus", "Creator", "User").unwrap();
//! graph.learn("User", "Language", "Java").unwrap();
//!
//! assert_eq!(graph.ask("Fraymus", "Creator").unwrap().as_str(), "User");
//! let java = ReasoningEngine::new()
//!     .multi_hop(&mut graph, "Fraymus", &["Creator", "Language"])
//!     .unwrap();
//! assert_eq!(java.as_str(), "Java");
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod reason;
pub mod simd;
pub mod store;
pub mod temporal;
pub mod vsa;
