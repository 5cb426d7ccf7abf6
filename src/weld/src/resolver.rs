//! Tie-breaking among several components that satisfy the same slot.

use tracing::trace;

use crate::key::{Key, TypeDescriptor};

/// Something the resolver can choose.
pub trait ResolutionCandidate {
    fn key(&self) -> &Key;

    /// The type the candidate produces, with its declared supertypes.
    fn produced_type(&self) -> &TypeDescriptor;
}

/// Picks exactly one candidate, or returns the keys of every candidate that
/// survived the tie-breaks.
///
/// The rules are applied in order and stop as soon as one candidate is
/// left:
///
/// 1. Candidates whose qualifier equals `preferred` (the slot's qualifier or
///    declared name) win over all others.
/// 2. Candidates whose type is a strict supertype of another candidate's
///    type are dropped.
/// 3. A single unqualified candidate wins over qualified ones.
///
/// A matching qualifier therefore always beats a more specific type, and a
/// more specific type always beats the absence of a qualifier. The
/// relative order of `candidates` is kept, so the outcome only depends on
/// the input.
pub fn choose<C>(mut candidates: Vec<C>, preferred: Option<&str>) -> Result<C, Vec<Key>>
where
    C: ResolutionCandidate,
{
    if candidates.len() <= 1 {
        return candidates.pop().ok_or_else(Vec::new);
    }

    let matching = preferred.map_or(0, |preferred| {
        candidates
            .iter()
            .filter(|c| c.key().qualifier() == Some(preferred))
            .count()
    });
    if matching > 0 {
        candidates.retain(|c| c.key().qualifier() == preferred);
        trace!(preferred, remaining = candidates.len(), "kept candidates matching qualifier");
        if candidates.len() == 1 {
            return Ok(candidates.remove(0));
        }
    }

    let redundant: Vec<bool> = candidates
        .iter()
        .map(|c| {
            candidates
                .iter()
                .any(|other| other.produced_type().is_strict_subtype_of(c.produced_type()))
        })
        .collect();
    let mut redundant = redundant.into_iter();
    candidates.retain(|_| !redundant.next().unwrap_or(false));
    trace!(remaining = candidates.len(), "dropped less specific candidates");
    if candidates.len() == 1 {
        return Ok(candidates.remove(0));
    }

    let unqualified: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.key().is_qualified())
        .map(|(index, _)| index)
        .collect();
    if let [index] = unqualified[..] {
        trace!("preferred the only unqualified candidate");
        return Ok(candidates.remove(index));
    }

    Err(candidates.iter().map(|c| c.key().clone()).collect())
}
