use crate::remote::RemoteError;
use crate::repository::RepositoryRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Hook type under which Drone registers itself with Gogs
pub const DRONE_HOOK_TYPE: &str = "gogs";

const PUSH_EVENT: &str = "push";
const TOKEN_PARAMETER: &str = "access_token";

/// A webhook as listed by `GET /repos/{owner}/{name}/hooks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    #[serde(rename = "type")]
    pub hook_type: String,

    #[serde(default)]
    pub events: Vec<String>,

    #[serde(default)]
    pub config: HookConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    #[serde(default)]
    pub url: Option<String>,
}

impl Webhook {
    fn is_drone_push_hook(&self) -> bool {
        self.hook_type == DRONE_HOOK_TYPE && self.events.iter().any(|e| e == PUSH_EVENT)
    }

    fn access_token(&self) -> Option<String> {
        let url = Url::parse(self.config.url.as_deref()?).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == TOKEN_PARAMETER)
            .map(|(_, value)| value.into_owned())
    }
}

/// Why no trigger token could be recovered for a repository.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unable to retrieve hooks of {repo}: {source}")]
    Remote {
        repo: String,
        #[source]
        source: RemoteError,
    },

    #[error("no Drone hook configured for {repo}")]
    HookNotFound { repo: String },

    #[error("Drone hook of {repo} carries no access_token parameter")]
    MissingAccessToken { repo: String },
}

/// Extracts the `access_token` of the first Drone push hook in `hooks`.
pub fn parse_hook_token(repo: &RepositoryRef, hooks: &[Webhook]) -> Result<String, TokenError> {
    let mut drone_hooks = hooks.iter().filter(|h| h.is_drone_push_hook()).peekable();

    if drone_hooks.peek().is_none() {
        return Err(TokenError::HookNotFound {
            repo: repo.full_name(),
        });
    }

    drone_hooks
        .find_map(Webhook::access_token)
        .ok_or_else(|| TokenError::MissingAccessToken {
            repo: repo.full_name(),
        })
}
