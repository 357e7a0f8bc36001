//! Caller-side memoization for calculator inputs.
//!
//! The engine functions are pure, so a caller that re-invokes them on every
//! parameter edit may keep a `Memo` to skip recomputation when the input has
//! not structurally changed. The engine itself never holds one.

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::VcToolsResult;

/// Remembers the last input (by structural hash and equality) and the output
/// computed for it.
#[derive(Debug, Clone)]
pub struct Memo<I, O> {
    last: Option<(u64, I, O)>,
}

impl<I, O> Default for Memo<I, O> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<I, O> Memo<I, O>
where
    I: Hash + Eq + Clone,
    O: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached output for `input`, or run `compute` and cache it.
    ///
    /// Errors are passed through and never cached.
    pub fn get_or_compute<E>(
        &mut self,
        input: &I,
        compute: impl FnOnce(&I) -> Result<O, E>,
    ) -> Result<O, E> {
        let key = structural_hash(input);
        if let Some((cached_key, cached_input, output)) = &self.last {
            if *cached_key == key && cached_input == input {
                return Ok(output.clone());
            }
        }
        let output = compute(input)?;
        self.last = Some((key, input.clone(), output.clone()));
        Ok(output)
    }

    /// Drop the cached entry.
    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn is_cached(&self, input: &I) -> bool {
        match &self.last {
            Some((key, cached, _)) => *key == structural_hash(input) && cached == input,
            None => false,
        }
    }
}

/// Structural hash of a parameter record.
pub fn structural_hash<I: Hash>(input: &I) -> u64 {
    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    hasher.finish()
}

/// Canonical JSON of a parameter record, for callers that cache serialised
/// output. Decimal scale is kept, so `100` and `100.0` give different keys.
pub fn canonical_key<I: Serialize>(input: &I) -> VcToolsResult<String> {
    Ok(serde_json::to_string(input)?)
}
