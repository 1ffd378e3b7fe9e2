//! Game data files. The original data ships with upper case DOS names but
//! installs often end up lower cased, so names are matched without case.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use gamestate_traits::AssetLoader;
use log::{debug, warn};

/// Loads files from one directory
#[derive(Debug, Clone)]
pub struct DataDir {
    path: PathBuf,
}

impl DataDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the directory holds any of `names`
    pub fn detect(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.find(n).is_some())
    }

    fn find(&self, name: &str) -> Option<PathBuf> {
        let exact = self.path.join(name);
        if exact.is_file() {
            return Some(exact);
        }
        let entries = fs::read_dir(&self.path).ok()?;
        entries
            .flatten()
            .find(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(name))
            .map(|e| e.path())
    }
}

impl AssetLoader for DataDir {
    fn load_file(&self, name: &str) -> Option<Vec<u8>> {
        let Some(path) = self.find(name) else {
            debug!("Unable to find '{name}' in {:?}", self.path);
            return None;
        };
        match fs::read(&path) {
            Ok(data) => {
                debug!("Loaded '{name}' size {}", data.len());
                Some(data)
            }
            Err(e) => {
                warn!("Unable to read {path:?}: {e}");
                None
            }
        }
    }
}

/// Files held in memory, for tests and tools
#[derive(Debug, Default, Clone)]
pub struct MemAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.files.insert(name.to_ascii_uppercase(), data);
    }
}

impl AssetLoader for MemAssets {
    fn load_file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.get(&name.to_ascii_uppercase()).cloned()
    }
}
