// crates/ota-core/src/depends.rs
// ============================================================================
// Module: Depends Map and Depends Index
// Description: The `depends` attribute map carried by every artifact and its
// derived, flattened `depends_idx` used for uniqueness indexing and
// resolver matching.
// Purpose: Share one canonical Cartesian-expansion implementation between
// the registry (uniqueness) and the resolver (device matching).
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An artifact's `depends` map maps an attribute name to either a
//! single acceptable value or a set of acceptable values. [`depends_idx`]
//! expands any sequence-valued entries into the Cartesian product of
//! concrete attribute assignments, each represented as an ordered
//! key/value list sorted by key. This flattened form is what
//! the uniqueness constraint `(name, depends_idx)` is checked against.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// A single `depends` attribute value: either one acceptable value, or a set
/// of acceptable values.
///
/// # Invariants
/// - [`Self::Sequence`] is never empty (an artifact that accepts nothing for
///   an attribute should omit the key instead).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsValue {
    /// A single acceptable value.
    Scalar(String),
    /// A set of acceptable values.
    Sequence(Vec<String>),
}

impl DependsValue {
    /// Returns the values as a slice regardless of representation.
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::Sequence(values) => values,
        }
    }

    /// Returns true if `candidate` is an acceptable value for this entry.
    #[must_use]
    pub fn accepts(&self, candidate: &str) -> bool {
        self.values().iter().any(|value| value == candidate)
    }
}

/// The attribute name every artifact's `depends` map always carries (spec
/// §3).
pub const DEVICE_TYPE_KEY: &str = "device_type";

/// An artifact's `depends` map: attribute name to acceptable value(s).
pub type DependsMap = BTreeMap<String, DependsValue>;

/// One concrete, fully-expanded attribute assignment: an ordered key/value
/// list sorted by key.
pub type DependsTuple = Vec<(String, String)>;

/// Computes the Cartesian-product expansion of a `depends` map across any
/// sequence-valued entries.
///
/// Each element of the returned vector is a [`DependsTuple`] — a
/// lexicographically key-sorted key/value list — covering exactly one
/// concrete combination of attribute values. A `depends` map with only
/// scalar entries expands to a single tuple.
#[must_use]
pub fn depends_idx(depends: &DependsMap) -> Vec<DependsTuple> {
    let mut combinations: Vec<DependsTuple> = vec![Vec::new()];
    for (key, value) in depends {
        let values = value.values();
        let mut next = Vec::with_capacity(combinations.len() * values.len().max(1));
        for combination in &combinations {
            for candidate in values {
                let mut extended = combination.clone();
                extended.push((key.clone(), candidate.clone()));
                next.push(extended);
            }
        }
        combinations = next;
    }
    for tuple in &mut combinations {
        tuple.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
    combinations
}
