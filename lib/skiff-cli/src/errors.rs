use std::time::Duration;

use netlify_client::models::DeployState;
use netlify_client::ClientError;
use thiserror::Error;

use crate::settings::SettingErrors;

#[remain::sorted]
#[derive(Debug, Error)]
pub enum SkiffCliError {
    #[error("cas error: {0}")]
    CasError(#[from] cas::CasError),

    #[error(transparent)]
    ClientError(#[from] ClientError),

    /// The deploy may still finish server-side; this only means the client
    /// stopped watching.
    #[error(
        "deploy {deploy_id} did not reach a terminal state within {timeout:?} (last state: {last_state})"
    )]
    DeployTimeout {
        deploy_id: String,
        last_state: DeployState,
        timeout: Duration,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The server asked for a hash no local file produces. Either the local
    /// tree changed mid-run or the manifest logic disagrees with the server.
    #[error("no local file matches required hash {hash}")]
    MissingLocalFile { hash: String },

    #[error("deploy negotiation for site {site_id} failed: {source}")]
    Negotiation {
        site_id: String,
        source: ClientError,
    },

    #[error(transparent)]
    SettingError(#[from] SettingErrors),

    #[error("fetching status of deploy {deploy_id} failed: {source}")]
    Status {
        deploy_id: String,
        source: ClientError,
    },

    #[error("toml deserialize error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("uploading {path} failed: {source}")]
    Upload { path: String, source: ClientError },

    #[error("walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),
}

pub type CliResult<T> = Result<T, SkiffCliError>;
