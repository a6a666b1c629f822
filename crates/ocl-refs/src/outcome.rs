use std::fmt;

use serde::Serialize;

/// What a mutation did to the top-level index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    /// The reference name that was edited.
    pub refname: String,
    /// Entries tagged with `refname` that were dropped from the index.
    pub removed: usize,
    /// Entries tagged with `refname` that were appended to the index.
    pub added: usize,
    /// Set when the edit touched more than one entry for the same name.
    pub ambiguity: Option<Ambiguity>,
}

impl MutationOutcome {
    pub(crate) fn new(refname: &str, removed: usize, added: usize) -> Self {
        Self {
            refname: refname.to_string(),
            removed,
            added,
            ambiguity: None,
        }
    }

    pub(crate) fn with_ambiguity(mut self, ambiguity: Option<Ambiguity>) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    /// Returns `true` if the index content was left as it was.
    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.added == 0
    }
}

/// More than one index entry shared a reference name during a mutation.
///
/// This is never an error. Callers decide whether to warn, prompt, or
/// ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ambiguity {
    /// Several existing entries were replaced by a single new one.
    Replaced { count: usize },
    /// Several existing entries were deleted together.
    Deleted { count: usize },
    /// Several entries were added under one name on purpose.
    Introduced { count: usize },
}

impl Ambiguity {
    /// Number of entries involved.
    pub fn count(&self) -> usize {
        match self {
            Self::Replaced { count } | Self::Deleted { count } | Self::Introduced { count } => {
                *count
            }
        }
    }
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replaced { count } => write!(
                f,
                "{count} references matched the given name; all of them were replaced"
            ),
            Self::Deleted { count } => write!(
                f,
                "{count} references matched the given name; all of them were deleted"
            ),
            Self::Introduced { count } => write!(
                f,
                "{count} descriptors were added under the same reference name; \
                 some tools may be unable to resolve it"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_outcome() {
        assert!(MutationOutcome::new("x", 0, 0).is_noop());
        assert!(!MutationOutcome::new("x", 1, 0).is_noop());
        assert!(!MutationOutcome::new("x", 0, 1).is_noop());
    }

    #[test]
    fn ambiguity_display_and_count() {
        let a = Ambiguity::Deleted { count: 3 };
        assert_eq!(a.count(), 3);
        assert!(a.to_string().contains("deleted"));
        assert!(Ambiguity::Introduced { count: 2 }
            .to_string()
            .contains("unable to resolve"));
    }

    #[test]
    fn outcome_serializes_for_json_output() {
        let outcome = MutationOutcome::new("latest", 2, 1)
            .with_ambiguity(Some(Ambiguity::Replaced { count: 2 }));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["refname"], "latest");
        assert_eq!(value["ambiguity"]["kind"], "replaced");
        assert_eq!(value["ambiguity"]["count"], 2);
    }
}
