//! Push-event payload understood by Drone's Gogs hook endpoint

use crate::repository::{Branch, RepositoryRef};
use serde::{Deserialize, Serialize};

const SENDER_USERNAME: &str = "drone";
const SENDER_AVATAR: &str = "static/drone.svg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: PayloadRepository,
    pub commits: Vec<PayloadCommit>,
    pub after: String,
    pub sender: PayloadUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadRepository {
    pub owner: PayloadOwner,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadOwner {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadCommit {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadUser {
    pub avatar_url: String,
    pub username: String,
}

impl HookPayload {
    /// Push of `branch` in `repo`, attributed to an upstream build of `source`.
    pub fn push(repo: &RepositoryRef, branch: &Branch, source: &RepositoryRef) -> Self {
        Self {
            git_ref: format!("refs/heads/{}", branch.name),
            repository: PayloadRepository {
                owner: PayloadOwner {
                    username: repo.owner.clone(),
                },
                name: repo.name.clone(),
            },
            commits: vec![PayloadCommit {
                message: format!("Triggered by upstream build of {}", source.full_name()),
            }],
            after: branch.commit.clone(),
            sender: PayloadUser {
                avatar_url: SENDER_AVATAR.to_string(),
                username: SENDER_USERNAME.to_string(),
            },
        }
    }
}

/// Body Drone answers a triggered hook with.
#[derive(Debug, Clone, Deserialize)]
pub struct HookResponse {
    #[serde(default)]
    pub number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_payload_wire_shape() {
        let payload = HookPayload::push(
            &RepositoryRef::new("docker", "app"),
            &Branch::new("feature/x", "9f8e7d"),
            &RepositoryRef::new("docker", "python"),
        );

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "ref": "refs/heads/feature/x",
                "repository": {"owner": {"username": "docker"}, "name": "app"},
                "commits": [{"message": "Triggered by upstream build of docker/python"}],
                "after": "9f8e7d",
                "sender": {"avatar_url": "static/drone.svg", "username": "drone"}
            })
        );
    }

    #[test]
    fn test_hook_response_number_is_optional() {
        let with: HookResponse = serde_json::from_value(json!({"number": 42, "status": "pending"})).unwrap();
        let without: HookResponse = serde_json::from_value(json!({})).unwrap();

        assert_eq!(with.number, Some(42));
        assert_eq!(without.number, None);
    }
}
