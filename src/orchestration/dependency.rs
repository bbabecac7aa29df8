//! Dependency expressions gating the merge job.

use crate::constants::DEPENDENCY_QUALIFIER;
use crate::models::{CollectedIdentifiers, JobIdentifier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `afterok:<id1>:<id2>:...` over accepted batch jobs, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyExpression {
    identifiers: Vec<JobIdentifier>,
}

impl DependencyExpression {
    pub fn identifiers(&self) -> &[JobIdentifier] {
        &self.identifiers
    }

    /// No upstream job made it into the expression; the gated job will
    /// not actually wait on anything
    pub fn is_degenerate(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl fmt::Display for DependencyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DEPENDENCY_QUALIFIER}:")?;
        for (position, id) in self.identifiers.iter().enumerate() {
            if position > 0 {
                f.write_str(":")?;
            }
            f.write_str(id.as_str())?;
        }
        Ok(())
    }
}

pub struct DependencyGraphBuilder;

impl DependencyGraphBuilder {
    /// Join collected identifiers under `afterok`, preserving order
    ///
    /// An empty collection still yields a syntactically valid expression;
    /// check [`DependencyExpression::is_degenerate`].
    pub fn build(collected: &CollectedIdentifiers) -> DependencyExpression {
        DependencyExpression {
            identifiers: collected.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collected(ids: &[&str]) -> CollectedIdentifiers {
        ids.iter().map(|id| JobIdentifier::from(*id)).collect()
    }

    #[test]
    fn preserves_submission_order() {
        let expr = DependencyGraphBuilder::build(&collected(&["a", "b", "c"]));
        assert_eq!(expr.to_string(), "afterok:a:b:c");
        assert!(!expr.is_degenerate());
    }

    #[test]
    fn single_identifier() {
        let expr = DependencyGraphBuilder::build(&collected(&["7"]));
        assert_eq!(expr.to_string(), "afterok:7");
    }

    #[test]
    fn empty_collection_is_degenerate() {
        let expr = DependencyGraphBuilder::build(&CollectedIdentifiers::new());
        assert_eq!(expr.to_string(), "afterok:");
        assert!(expr.is_degenerate());
        assert!(expr.identifiers().is_empty());
    }
}
