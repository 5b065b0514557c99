use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{parse_word_lines, WordRecord};

/// Read a one-word-per-line UTF-8 dictionary file.
pub fn read_dict_file(path: &Path) -> io::Result<Vec<WordRecord>> {
    let body = std::fs::read_to_string(path)?;
    Ok(parse_word_lines(&body))
}

/// Expand a `;`-delimited extension-dictionary list into concrete files.
/// Entries resolve against `root`; directories expand recursively to their
/// regular files. Missing entries are logged and skipped.
pub fn expand_dict_paths(root: &Path, list: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in list.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let path = root.join(entry);
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            for item in WalkDir::new(&path) {
                match item {
                    Ok(item) if item.file_type().is_file() => files.push(item.into_path()),
                    Ok(_) => {}
                    Err(error) => {
                        tracing::warn!(%error, "failed listing extension dictionary entry");
                    }
                }
            }
        } else {
            tracing::warn!(path = %path.display(), "extension dictionary not found");
        }
    }
    files
}
