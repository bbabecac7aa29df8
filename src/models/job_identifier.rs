use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token the scheduler hands back for an accepted job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobIdentifier(String);

impl JobIdentifier {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifiers of accepted batch jobs, in submission order
///
/// Append-only: the batch loop pushes into it and hands it on to the
/// dependency builder. Failed submissions never contribute an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectedIdentifiers(Vec<JobIdentifier>);

impl CollectedIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: JobIdentifier) {
        self.0.push(id);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobIdentifier> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[JobIdentifier] {
        &self.0
    }
}

impl FromIterator<JobIdentifier> for CollectedIdentifiers {
    fn from_iter<I: IntoIterator<Item = JobIdentifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CollectedIdentifiers {
    type Item = &'a JobIdentifier;
    type IntoIter = std::slice::Iter<'a, JobIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
