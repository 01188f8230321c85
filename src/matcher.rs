use rapidfuzz::distance::levenshtein;

use crate::error::{Error, Result};
use crate::mapping::TranslationMapping;

pub const DEFAULT_CUTOFF: f64 = 0.85;

/// Minimum similarity a fuzzy candidate needs, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Cutoff(f64);

impl Cutoff {
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidCutoff(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Cutoff {
    fn default() -> Self {
        Self(DEFAULT_CUTOFF)
    }
}

impl TryFrom<f64> for Cutoff {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchResult<'a> {
    Exact(&'a str),
    Fuzzy {
        target: &'a str,
        key: &'a str,
        score: f64,
    },
    /// Carries the normalized query that found nothing.
    Miss(&'a str),
}

impl<'a> MatchResult<'a> {
    pub fn target(&self) -> Option<&'a str> {
        match self {
            MatchResult::Exact(target) | MatchResult::Fuzzy { target, .. } => Some(target),
            MatchResult::Miss(_) => None,
        }
    }
}

/// Similarity ratio in `[0, 1]`: normalized Levenshtein similarity over characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    levenshtein::normalized_similarity(a.chars(), b.chars())
}

/// Looks `query` up exactly, then (when `fuzzy` is set) by nearest key.
///
/// Among keys tied at the best score the greatest key in sort order wins.
pub fn resolve<'a>(
    query: &'a str,
    mapping: &'a TranslationMapping,
    fuzzy: bool,
    cutoff: Cutoff,
) -> MatchResult<'a> {
    if query.is_empty() {
        return MatchResult::Miss(query);
    }
    if let Some(target) = mapping.get(query) {
        return MatchResult::Exact(target);
    }
    if !fuzzy || mapping.is_empty() {
        return MatchResult::Miss(query);
    }

    let mut best: Option<(f64, &str, &str)> = None;
    for (key, target) in mapping.iter() {
        let score = similarity(query, key);
        if best.is_none_or(|(top, _, _)| score >= top) {
            best = Some((score, key, target));
        }
    }
    match best {
        Some((score, key, target)) if score >= cutoff.value() => {
            MatchResult::Fuzzy { target, key, score }
        }
        _ => MatchResult::Miss(query),
    }
}
