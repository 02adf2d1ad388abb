use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of the deploy-creation call: the manifest of site paths to content
/// hashes. `async` is accepted by the provider to make deploy processing
/// asynchronous; the default flow leaves it unset and it is omitted from the
/// wire body.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DeployRequest {
    pub files: BTreeMap<String, String>,

    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub asynchronous: Option<bool>,
}

/// A deploy as reported by the server. The client never mutates one; it is
/// created by negotiation and only re-read while polling.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Deploy {
    pub id: String,

    pub state: DeployState,

    /// Hashes from the submitted manifest the server does not already have.
    #[serde(default)]
    pub required: Vec<String>,

    #[serde(default)]
    pub site_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub ssl_url: Option<String>,

    #[serde(default)]
    pub links: DeployLinks,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DeployLinks {
    #[serde(default)]
    pub alias: Option<String>,

    #[serde(default)]
    pub permalink: Option<String>,
}

/// Server-owned deploy lifecycle. Anything not in the terminal set is
/// treated as still in flight, including states this client has never heard
/// of.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployState {
    New,
    Enqueued,
    Building,
    Uploading,
    Uploaded,
    Preparing,
    Prepared,
    Processing,
    Ready,
    Error,
    Failed,
    #[serde(other)]
    Unknown,
}

impl DeployState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeployState::Ready | DeployState::Error | DeployState::Failed
        )
    }
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            DeployState::New => "new",
            DeployState::Enqueued => "enqueued",
            DeployState::Building => "building",
            DeployState::Uploading => "uploading",
            DeployState::Uploaded => "uploaded",
            DeployState::Preparing => "preparing",
            DeployState::Prepared => "prepared",
            DeployState::Processing => "processing",
            DeployState::Ready => "ready",
            DeployState::Error => "error",
            DeployState::Failed => "failed",
            DeployState::Unknown => "unknown",
        };
        f.write_str(state)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Site {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub ssl_url: Option<String>,
}

/// Status payload returned when a zip archive is submitted as a build.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SiteBuild {
    pub id: String,

    #[serde(default)]
    pub deploy_id: Option<String>,

    #[serde(default)]
    pub sha: Option<String>,

    #[serde(default)]
    pub done: bool,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
}
