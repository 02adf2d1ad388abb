use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::hash::{Hash, Hasher};
use crate::{CasError, CasResult};

/// The content digest of a directory tree: a manifest from site path to
/// content hash, plus a reverse index from hash to the local files carrying
/// that content. Built fresh per deploy run and never mutated afterwards.
pub struct FileDigest {
    files: BTreeMap<String, Hash>,
    index: HashMap<Hash, Vec<PathBuf>>,
}

impl FileDigest {
    /// Walks `root` and hashes every regular file below it. Entries are
    /// visited in file-name order so duplicate-content lookups resolve to the
    /// same source file on every filesystem.
    pub fn from_path<P: AsRef<Path>>(root: P) -> CasResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(CasError::InvalidEntry(root.to_path_buf()));
        }

        let mut files = BTreeMap::new();
        let mut index: HashMap<Hash, Vec<PathBuf>> = HashMap::new();

        for entry in WalkDir::new(root).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            // walkdir only yields paths below the root it was given
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };

            let hash = hash_file(entry.path())?;
            files.insert(site_path(rel), hash);
            index.entry(hash).or_default().push(rel.to_path_buf());
        }

        if files.is_empty() {
            return Err(CasError::EmptyTree(root.to_path_buf()));
        }

        Ok(Self { files, index })
    }

    /// The manifest: absolute site path (leading slash, forward-slash
    /// separated on every host OS) to content hash.
    pub fn files(&self) -> &BTreeMap<String, Hash> {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// All local relative paths whose content hashes to `hash`.
    pub fn candidates(&self, hash: &Hash) -> &[PathBuf] {
        self.index.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The local file to read when the server asks for `hash`: the first
    /// candidate in walk order.
    pub fn source_for(&self, hash: &Hash) -> Option<&Path> {
        self.candidates(hash).first().map(PathBuf::as_path)
    }
}

/// Normalizes a relative path into the site-path shape the provider compares
/// manifests with: leading slash, `/` separators regardless of the host OS.
pub fn site_path(rel: &Path) -> String {
    let mut key = String::new();
    for component in rel.components() {
        key.push('/');
        key.push_str(&component.as_os_str().to_string_lossy());
    }
    key
}

fn hash_file<P: AsRef<Path>>(path: P) -> CasResult<Hash> {
    let input = File::open(path)?;
    let mut reader = BufReader::new(input);

    let mut hasher = Hasher::new();
    let mut buffer = [0; 8192];

    loop {
        let count = reader.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }

    Ok(hasher.finalize())
}
