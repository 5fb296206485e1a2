//! Shared label-update strategy (spec §4.9): every resource's `update`
//! method carries either a full replacement, an upsert-merge, or
//! neither — never both.

use memoria_core::{LabelMap, Result, Status};

/// Carried on every resource's update request. At most one of the two
/// fields may be `Some`.
#[derive(Debug, Clone, Default)]
pub struct LabelUpdate {
    pub replace: Option<LabelMap>,
    pub merge: Option<LabelMap>,
}

impl LabelUpdate {
    /// Applies this update against `existing`, returning the labels the
    /// row should carry afterward.
    ///
    /// - Both `Some` → `INVALID_ARGUMENT`.
    /// - `replace` only → the supplied map wins outright.
    /// - `merge` only → upsert: `existing ∪ supplied`, supplied wins on
    ///   key conflict, no keys are removed.
    /// - Neither → `existing` unchanged.
    pub fn apply(&self, existing: &LabelMap) -> Result<LabelMap> {
        match (&self.replace, &self.merge) {
            (Some(_), Some(_)) => Err(Status::invalid_argument(
                "labels update may set replace or merge, not both",
            )),
            (Some(replace), None) => Ok(replace.clone()),
            (None, Some(merge)) => {
                let mut out = existing.clone();
                for (k, v) in merge {
                    out.insert(k.clone(), v.clone());
                }
                Ok(out)
            }
            (None, None) => Ok(existing.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> LabelMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn rejects_both_replace_and_merge() {
        let update = LabelUpdate {
            replace: Some(map(&[("a", "1")])),
            merge: Some(map(&[("b", "2")])),
        };
        let err = update.apply(&map(&[])).unwrap_err();
        assert_eq!(err.code, memoria_core::StatusCode::InvalidArgument);
    }

    #[test]
    fn replace_wins_outright() {
        let update = LabelUpdate {
            replace: Some(map(&[("a", "1")])),
            merge: None,
        };
        let existing = map(&[("z", "9")]);
        assert_eq!(update.apply(&existing).unwrap(), map(&[("a", "1")]));
    }

    #[test]
    fn merge_upserts_with_supplied_winning_on_conflict() {
        let update = LabelUpdate {
            replace: None,
            merge: Some(map(&[("a", "new")])),
        };
        let existing = map(&[("a", "old"), ("b", "2")]);
        assert_eq!(update.apply(&existing).unwrap(), map(&[("a", "new"), ("b", "2")]));
    }

    #[test]
    fn neither_leaves_labels_unchanged() {
        let update = LabelUpdate::default();
        let existing = map(&[("a", "1")]);
        assert_eq!(update.apply(&existing).unwrap(), existing);
    }
}
