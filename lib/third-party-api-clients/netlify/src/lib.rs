//! Client for the hosting provider's deploy API.
//!
//! Everything here is blocking: a deploy run is a strictly sequential
//! pipeline, so each call carries its own timeout instead of an async
//! runtime. Metadata reads get a short timeout, deploy creation a longer
//! one, and file/archive uploads the longest.

pub mod models;

use std::time::Duration;

use reqwest::blocking::multipart;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use thiserror::Error;
use tracing::debug;

use crate::models::{Deploy, DeployRequest, Site, SiteBuild};

pub use reqwest::StatusCode;

pub const DEFAULT_HOST: &str = "https://api.netlify.com/api/v1";

const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
const CREATE_DEPLOY_TIMEOUT: Duration = Duration::from_secs(60);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

mod support {
    use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

    // `/` is deliberately absent: path separators go through unescaped
    const PATH_SET: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'#')
        .add(b'<')
        .add(b'>')
        .add(b'?')
        .add(b'`')
        .add(b'{')
        .add(b'}');

    pub(crate) fn encode_path(pc: &str) -> String {
        utf8_percent_encode(pc, PATH_SET).to_string()
    }
}

/// Errors returned by the client
#[remain::sorted]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Generic HTTP Error
    #[error("HTTP Error. Code: {status}, message: {body}")]
    HttpError { status: StatusCode, body: String },

    /// Errors returned by reqwest
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// Serde JSON parsing error
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Various forms of authentication credentials supported by the provider.
#[derive(Clone, PartialEq)]
pub enum Credentials {
    AccessToken(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::AccessToken(value) => f
                .debug_tuple("Credentials::AccessToken")
                .field(&"*".repeat(value.len()))
                .finish(),
        }
    }
}

/// Entrypoint for interacting with the deploy API.
#[derive(Clone)]
pub struct Client {
    host: String,
    agent: String,
    client: reqwest::blocking::Client,
    credentials: Credentials,
}

impl Client {
    pub fn new<H, A>(host: H, agent: A, credentials: Credentials) -> ClientResult<Self>
    where
        H: Into<String>,
        A: Into<String>,
    {
        let http = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            host: host.into(),
            agent: agent.into(),
            client: http,
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    fn bearer(&self) -> String {
        match &self.credentials {
            Credentials::AccessToken(token) => format!("Bearer {token}"),
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        timeout: Duration,
    ) -> reqwest::blocking::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .timeout(timeout)
            .header(USER_AGENT, &self.agent)
            .header(AUTHORIZATION, self.bearer())
    }

    fn execute<Out>(&self, req: reqwest::blocking::RequestBuilder) -> ClientResult<Out>
    where
        Out: serde::de::DeserializeOwned + 'static,
    {
        let response = req.send()?;

        let status = response.status();
        let response_body = response.bytes()?;

        if status.is_success() {
            debug!("Received successful response. Read payload.");

            let parsed_response = if status == StatusCode::NO_CONTENT
                || std::any::TypeId::of::<Out>() == std::any::TypeId::of::<()>()
            {
                serde_json::from_str("null")?
            } else {
                serde_json::from_slice::<Out>(&response_body)?
            };
            Ok(parsed_response)
        } else {
            let error = if response_body.is_empty() {
                ClientError::HttpError {
                    status,
                    body: "empty response".into(),
                }
            } else {
                ClientError::HttpError {
                    status,
                    body: String::from_utf8_lossy(&response_body).into(),
                }
            };
            Err(error)
        }
    }

    /// Submits a file manifest for a new deploy. The response's `required`
    /// list is the subset of manifest hashes the server does not already
    /// have stored.
    pub fn create_deploy(&self, site_id: &str, deploy: &DeployRequest) -> ClientResult<Deploy> {
        debug!(site_id, files = deploy.files.len(), "creating deploy");
        let req = self
            .request(
                Method::POST,
                &format!("/sites/{}/deploys", support::encode_path(site_id)),
                CREATE_DEPLOY_TIMEOUT,
            )
            .json(deploy);
        self.execute(req)
    }

    /// Uploads one file's raw bytes into an open deploy. `path` is the
    /// deploy-relative file path without a leading slash; it is
    /// percent-encoded here, path separators excepted.
    pub fn upload_deploy_file(
        &self,
        deploy_id: &str,
        path: &str,
        content: Vec<u8>,
    ) -> ClientResult<()> {
        let encoded = support::encode_path(path.trim_start_matches('/'));
        debug!(deploy_id, path, "uploading deploy file");
        let req = self
            .request(
                Method::PUT,
                &format!("/deploys/{deploy_id}/files/{encoded}"),
                UPLOAD_TIMEOUT,
            )
            .header(CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.as_ref())
            .body(content);
        self.execute(req)
    }

    pub fn get_deploy(&self, deploy_id: &str) -> ClientResult<Deploy> {
        let req = self.request(
            Method::GET,
            &format!("/deploys/{}", support::encode_path(deploy_id)),
            METADATA_TIMEOUT,
        );
        self.execute(req)
    }

    pub fn get_site(&self, site_id: &str) -> ClientResult<Site> {
        let req = self.request(
            Method::GET,
            &format!("/sites/{}", support::encode_path(site_id)),
            METADATA_TIMEOUT,
        );
        self.execute(req)
    }

    /// Submits a whole-site zip archive as a build artifact. Independent of
    /// the digest deploy flow.
    pub fn create_site_build(
        &self,
        site_id: &str,
        archive_name: &str,
        archive: Vec<u8>,
    ) -> ClientResult<SiteBuild> {
        debug!(site_id, bytes = archive.len(), "submitting archive build");
        let part = multipart::Part::bytes(archive)
            .file_name(archive_name.to_string())
            .mime_str("application/zip")?;
        let form = multipart::Form::new().part("zip", part);
        let req = self
            .request(
                Method::POST,
                &format!("/sites/{}/builds", support::encode_path(site_id)),
                UPLOAD_TIMEOUT,
            )
            .multipart(form);
        self.execute(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_path_escapes_reserved_characters() {
        assert_eq!(
            support::encode_path("blog/my page.html"),
            "blog/my%20page.html"
        );
        assert_eq!(support::encode_path("a#b?c"), "a%23b%3Fc");
    }

    #[test]
    fn encode_path_preserves_separators() {
        assert_eq!(
            support::encode_path("deep/nested/dir/file.css"),
            "deep/nested/dir/file.css"
        );
    }

    #[test]
    fn credentials_debug_redacts_token() {
        let debug = format!("{:?}", Credentials::AccessToken("secret".into()));
        assert!(!debug.contains("secret"));
    }
}
