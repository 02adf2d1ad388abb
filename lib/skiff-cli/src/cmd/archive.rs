//! The whole-archive deploy flow: zip the folder and hand it to the provider
//! as a build artifact. Deliberately shares nothing with the digest flow.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;

use netlify_client::{Client, Credentials};
use serde::Serialize;
use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::CliResult;
use crate::settings::{RunSettings, Settings};

#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub site: String,
    pub build_id: String,
    pub deploy_id: Option<String>,
    pub done: bool,
    pub error: Option<String>,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build {} accepted for site {}", self.build_id, self.site)?;
        if let Some(error) = &self.error {
            write!(f, "\nerror: {error}")?;
        }
        Ok(())
    }
}

pub fn invoke(settings: &Settings, site: Option<String>, dir: &Path) -> CliResult<BuildReport> {
    let run = RunSettings::resolve(settings, site)?;

    let archive = archive_tree(dir)?;
    info!(bytes = archive.len(), "zipped site folder");

    let client = Client::new(
        &run.host,
        crate::USER_AGENT,
        Credentials::AccessToken(run.token.clone()),
    )?;

    // display name is cosmetic; fall back to the raw id when the site
    // cannot be read
    let site_name = client
        .get_site(&run.site_id)
        .ok()
        .and_then(|site| site.name)
        .unwrap_or_else(|| run.site_id.clone());
    info!(site = %site_name, "submitting archive build");

    let build = client.create_site_build(&run.site_id, "site.zip", archive)?;

    Ok(BuildReport {
        site: site_name,
        build_id: build.id,
        deploy_id: build.deploy_id,
        done: build.done,
        error: build.error,
    })
}

/// Zips every regular file under `dir` into an in-memory archive, entry
/// names relative to `dir` with forward slashes.
pub(crate) fn archive_tree(dir: &Path) -> CliResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(dir).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(dir) else {
            continue;
        };

        let name = cas::site_path(rel);
        writer.start_file(name.trim_start_matches('/'), options)?;

        let mut file = File::open(entry.path())?;
        io::copy(&mut file, &mut writer)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use testing::TempSite;

    use super::*;

    #[test]
    fn archive_contains_relative_entries() {
        let site = TempSite::new()
            .file("index.html", "<html></html>")
            .file("blog/post.html", "post");

        let bytes = archive_tree(site.path()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["blog/post.html", "index.html"]);
    }

    #[test]
    fn archive_round_trips_content() {
        use std::io::Read;

        let site = TempSite::new().file("index.html", "hello archive");

        let bytes = archive_tree(site.path()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut entry = archive.by_name("index.html").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello archive");
    }
}
