//! Relation binder: encodes (subject, relation, object) triples as single
//! hypervectors and recovers the object from a superposition of them.
//!
//! ```text
//! fact  = S ⊕ ρ¹(R) ⊕ ρ²(O)
//! query = ρ⁻²(H ⊕ S ⊕ ρ¹(R))   ≈ O   when fact ∈ H
//! ```
//!
//! The distinct rotations keep the three slots apart, so `(A, R, B)` and
//! `(B, R, A)` encode to unrelated vectors.

use crate::vsa::HyperVector;
use crate::vsa::ops::{VsaOps, VsaResult};

/// Rotation applied to the relation slot.
pub const RELATION_SHIFT: isize = 1;

/// Rotation applied to the object slot.
pub const OBJECT_SHIFT: isize = 2;

/// Role-disambiguating triple encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationBinder {
    relation_shift: isize,
    object_shift: isize,
}

impl Default for RelationBinder {
    fn default() -> Self {
        Self {
            relation_shift: RELATION_SHIFT,
            object_shift: OBJECT_SHIFT,
        }
    }
}

impl RelationBinder {
    /// Encode a fact: `subject ⊕ permute(relation, 1) ⊕ permute(object, 2)`.
    pub fn encode_fact(
        &self,
        ops: &VsaOps,
        subject: &HyperVector,
        relation: &HyperVector,
        object: &HyperVector,
    ) -> VsaResult<HyperVector> {
        let rel = ops.permute(relation, self.relation_shift);
        let obj = ops.permute(object, self.object_shift);
        ops.bind(&ops.bind(subject, &rel)?, &obj)
    }

    /// Recover a noisy estimate of the object for `(subject, relation)`.
    ///
    /// The result is rotated back into the object's un-permuted coordinate
    /// space so it can be decoded against plain concept prototypes.
    pub fn query(
        &self,
        ops: &VsaOps,
        hologram: &HyperVector,
        subject: &HyperVector,
        relation: &HyperVector,
    ) -> VsaResult<HyperVector> {
        let rel = ops.permute(relation, self.relation_shift);
        let raw = ops.bind(&ops.bind(hologram, subject)?, &rel)?;
        Ok(ops.permute(&raw, -self.object_shift))
    }
}
