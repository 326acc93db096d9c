use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root for local outputs and caches.
///
/// `resolve` only joins paths; `ensure_dir` also creates the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePath {
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
}

impl Default for BasePath {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

impl BasePath {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.base_path
    }

    /// Join `parts` onto the base path without touching the filesystem.
    pub fn resolve<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        parts
            .into_iter()
            .fold(self.base_path.clone(), |acc, part| acc.join(part))
    }

    /// Resolve `parts` and create the directory, parents included.
    pub fn ensure_dir<I, P>(&self, parts: I) -> io::Result<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let path = self.resolve(parts);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".dagma_data")
}
