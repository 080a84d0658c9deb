//! Repository and branch identities shared by both service clients

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A repository identified by owner and name.
///
/// Identity is structural: two references naming the same owner and name are
/// the same repository, whichever API response they were read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Canonical `owner/name` form, as used in API paths.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!(
                "'{}' is not a repository name of the form owner/name",
                s
            )),
        }
    }
}

/// Tip of a branch at the time it was listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: String,
}

impl Branch {
    pub fn new(name: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit: commit.into(),
        }
    }
}

/// Branches of each repository still in the running.
pub type RepoBranchMap = BTreeMap<RepositoryRef, Vec<Branch>>;

/// Everything needed to trigger the matching branches of one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTrigger {
    pub branches: Vec<Branch>,
    pub token: String,
}

pub type BuildTriggers = BTreeMap<RepositoryRef, BuildTrigger>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_full_name() {
        let repo = RepositoryRef::new("docker", "python");
        assert_eq!(repo.full_name(), "docker/python");
        assert_eq!(repo.to_string(), "docker/python");
    }

    #[test]
    fn test_equality_is_by_value() {
        let mut seen = HashSet::new();
        seen.insert(RepositoryRef::new("docker", "python"));

        assert!(seen.contains(&"docker/python".parse::<RepositoryRef>().unwrap()));
        assert!(!seen.contains(&RepositoryRef::new("docker", "node")));
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert!("python".parse::<RepositoryRef>().is_err());
        assert!("/python".parse::<RepositoryRef>().is_err());
        assert!("docker/".parse::<RepositoryRef>().is_err());
        assert!("a/b/c".parse::<RepositoryRef>().is_err());
    }
}
