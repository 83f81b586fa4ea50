//! Discovers configuration/state file pairs under a directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// One discovered unit of work: a configuration file and, if its directory
/// contains exactly one, the paired state file.
#[derive(Debug, Clone)]
pub struct FilePair {
    /// `.tf` configuration file.
    pub config: PathBuf,
    /// Sibling `.tfstate` file, when the directory has exactly one.
    pub state: Option<PathBuf>,
}

/// Walk `dir` and pair every `.tf` file with its directory's lone
/// `.tfstate` file, if any. A directory with more than one `.tfstate` file
/// is ambiguous, so its configs are left unpaired rather than guessed at.
///
/// # Errors
///
/// Returns an error if `dir` cannot be walked (e.g. a broken symlink or a
/// permission failure).
pub fn discover(dir: &Path) -> Result<Vec<FilePair>> {
    let mut configs = Vec::new();
    let mut states_by_dir: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| Error::Internal(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path().to_path_buf();
        match path.extension().and_then(|e| e.to_str()) {
            Some("tf") => configs.push(path),
            Some("tfstate") => {
                let parent = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
                states_by_dir.entry(parent).or_default().push(path);
            }
            _ => {}
        }
    }

    configs.sort();
    let pairs = configs
        .into_iter()
        .map(|config| {
            let parent = config.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            let state = states_by_dir.get(&parent).and_then(|states| match states.as_slice() {
                [one] => Some(one.clone()),
                _ => None,
            });
            FilePair { config, state }
        })
        .collect();

    Ok(pairs)
}
