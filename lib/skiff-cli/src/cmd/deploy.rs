//! The digest deploy flow: hash the tree, negotiate which hashes the server
//! is missing, upload those files, poll until the deploy settles. Strictly
//! sequential; any failure aborts the run.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cas::FileDigest;
use netlify_client::models::{Deploy, DeployRequest, DeployState};
use netlify_client::{Client, Credentials};
use serde::Serialize;
use tracing::info;

use crate::errors::{CliResult, SkiffCliError};
use crate::poll;
use crate::settings::{RunSettings, Settings};

pub struct DeployOptions {
    /// Compute and report the digest without contacting the provider.
    pub dry_run: bool,
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            timeout: poll::DEFAULT_POLL_TIMEOUT,
            interval: poll::DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DeployOutcome {
    DryRun { files: BTreeMap<String, String> },
    Deployed(DeployReport),
}

#[derive(Debug, Serialize)]
pub struct DeployReport {
    pub id: String,
    pub state: DeployState,
    pub uploaded: usize,
    pub url: Option<String>,
    pub alias: Option<String>,
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployOutcome::DryRun { files } => {
                writeln!(f, "files that would be deployed:")?;
                for (path, hash) in files {
                    writeln!(f, "{path} {hash}")?;
                }
                Ok(())
            }
            DeployOutcome::Deployed(report) => report.fmt(f),
        }
    }
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deploy state: {}", self.state)?;
        if let Some(alias) = &self.alias {
            write!(f, "\nalias: {alias}")?;
        } else if let Some(url) = &self.url {
            write!(f, "\nurl: {url}")?;
        }
        Ok(())
    }
}

pub fn invoke(
    settings: &Settings,
    site: Option<String>,
    dir: &Path,
    opts: &DeployOptions,
) -> CliResult<DeployOutcome> {
    let digest = FileDigest::from_path(dir)?;
    info!(files = digest.file_count(), "computed content digest");

    if opts.dry_run {
        let files = digest
            .files()
            .iter()
            .map(|(path, hash)| (path.clone(), hash.to_string()))
            .collect();
        return Ok(DeployOutcome::DryRun { files });
    }

    let run = RunSettings::resolve(settings, site)?;
    let client = Client::new(
        &run.host,
        crate::USER_AGENT,
        Credentials::AccessToken(run.token.clone()),
    )?;

    let deploy = negotiate(&client, &run.site_id, &digest)?;
    let uploads = plan_uploads(&digest, &deploy.required)?;
    let uploaded = upload_files(&client, dir, &deploy.id, &uploads)?;

    let finished = poll::wait_for_terminal(
        &deploy.id,
        || client.get_deploy(&deploy.id),
        opts.timeout,
        opts.interval,
    )?;
    info!(deploy_id = %finished.id, state = %finished.state, "deploy finished");

    Ok(DeployOutcome::Deployed(DeployReport {
        id: finished.id.clone(),
        state: finished.state,
        uploaded,
        url: finished.ssl_url,
        alias: finished.links.alias,
    }))
}

fn negotiate(client: &Client, site_id: &str, digest: &FileDigest) -> CliResult<Deploy> {
    let request = DeployRequest {
        files: digest
            .files()
            .iter()
            .map(|(path, hash)| (path.clone(), hash.to_string()))
            .collect(),
        asynchronous: None,
    };

    let deploy = client
        .create_deploy(site_id, &request)
        .map_err(|source| SkiffCliError::Negotiation {
            site_id: site_id.to_string(),
            source,
        })?;
    info!(
        deploy_id = %deploy.id,
        required = deploy.required.len(),
        "deploy created"
    );
    Ok(deploy)
}

/// Resolves every required hash to a local source file. Runs to completion
/// before any upload starts, so a manifest mismatch fails the run without a
/// single network call.
pub(crate) fn plan_uploads(digest: &FileDigest, required: &[String]) -> CliResult<Vec<PathBuf>> {
    let mut uploads = Vec::with_capacity(required.len());
    for hash in required {
        let parsed = hash
            .parse::<cas::Hash>()
            .map_err(|_| SkiffCliError::MissingLocalFile { hash: hash.clone() })?;
        let source = digest
            .source_for(&parsed)
            .ok_or_else(|| SkiffCliError::MissingLocalFile { hash: hash.clone() })?;
        uploads.push(source.to_path_buf());
    }
    Ok(uploads)
}

fn upload_files(
    client: &Client,
    root: &Path,
    deploy_id: &str,
    uploads: &[PathBuf],
) -> CliResult<usize> {
    for rel in uploads {
        let content = fs::read(root.join(rel))?;
        // the provider addresses uploads by the manifest path minus its
        // leading slash
        let path = cas::site_path(rel).trim_start_matches('/').to_string();
        info!(deploy_id, path = %path, bytes = content.len(), "uploading file");

        client
            .upload_deploy_file(deploy_id, &path, content)
            .map_err(|source| SkiffCliError::Upload {
                path: path.clone(),
                source,
            })?;
    }
    Ok(uploads.len())
}

#[cfg(test)]
mod tests {
    use testing::TempSite;

    use super::*;

    #[test]
    fn plan_resolves_required_hashes_to_sources() {
        let site = TempSite::new()
            .file("index.html", "abc")
            .file("about/index.html", "abc")
            .file("style.css", "xyz");
        let digest = FileDigest::from_path(site.path()).unwrap();
        assert_eq!(digest.file_count(), 3);

        // duplicate content collapses to a single hash
        let distinct: std::collections::HashSet<_> = digest.files().values().collect();
        assert_eq!(distinct.len(), 2);

        let required = vec![cas::Hash::new(b"xyz").to_string()];
        let uploads = plan_uploads(&digest, &required).unwrap();

        assert_eq!(uploads, vec![PathBuf::from("style.css")]);
    }

    #[test]
    fn unknown_required_hash_fails_before_any_upload() {
        let site = TempSite::new().file("index.html", "abc");
        let digest = FileDigest::from_path(site.path()).unwrap();

        let required = vec![cas::Hash::new(b"not-local").to_string()];
        let result = plan_uploads(&digest, &required);

        assert!(matches!(
            result,
            Err(SkiffCliError::MissingLocalFile { hash }) if hash == required[0]
        ));
    }

    #[test]
    fn malformed_required_hash_is_a_missing_file() {
        let site = TempSite::new().file("index.html", "abc");
        let digest = FileDigest::from_path(site.path()).unwrap();

        let result = plan_uploads(&digest, &["not-a-hash".to_string()]);
        assert!(matches!(
            result,
            Err(SkiffCliError::MissingLocalFile { .. })
        ));
    }

    #[test]
    fn empty_required_list_plans_nothing() {
        let site = TempSite::new().file("index.html", "abc");
        let digest = FileDigest::from_path(site.path()).unwrap();

        assert!(plan_uploads(&digest, &[]).unwrap().is_empty());
    }

    #[test]
    fn dry_run_reports_manifest_without_settings() {
        let site = TempSite::new()
            .file("index.html", "abc")
            .file("style.css", "xyz");

        let outcome = invoke(
            &Settings::default(),
            None,
            site.path(),
            &DeployOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();

        match outcome {
            DeployOutcome::DryRun { files } => {
                assert_eq!(files.len(), 2);
                assert_eq!(
                    files["/index.html"],
                    cas::Hash::new(b"abc").to_string()
                );
            }
            other => panic!("expected dry run outcome, got {other:?}"),
        }
    }

    #[test]
    fn empty_tree_aborts_before_negotiation() {
        let site = TempSite::new();
        let result = invoke(
            &Settings::default(),
            None,
            site.path(),
            &DeployOptions::default(),
        );
        assert!(matches!(
            result,
            Err(SkiffCliError::CasError(cas::CasError::EmptyTree(_)))
        ));
    }
}
