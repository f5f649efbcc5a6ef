use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::VaultSettings;

use super::model::VaultIndex;

fn normalized_extensions(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

pub(super) fn has_extension(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// `root`-relative path with `/` separators, or `None` outside `root`.
pub(super) fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    (!parts.is_empty()).then(|| parts.join("/"))
}

impl VaultIndex {
    /// Walk `root` and record every audio and note file.
    ///
    /// Unreadable entries are skipped.
    pub fn scan(root: &Path, settings: &VaultSettings) -> Self {
        let audio_exts = normalized_extensions(&settings.extensions);
        let note_exts = normalized_extensions(&settings.note_extensions);

        let mut audio = HashSet::new();
        let mut notes = Vec::new();

        let walker = WalkDir::new(root).follow_links(settings.follow_links);
        for entry in walker
            .into_iter()
            .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable vault entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if has_extension(path, &audio_exts) {
                if let Some(key) = relative_key(root, path) {
                    audio.insert(key);
                }
            } else if has_extension(path, &note_exts) {
                notes.push(path.to_path_buf());
            }
        }
        notes.sort();

        if audio.is_empty() {
            warn!(root = %root.display(), "no audio files found in vault");
        }
        debug!(audio = audio.len(), notes = notes.len(), "vault scanned");

        Self {
            root: root.to_path_buf(),
            audio,
            notes,
        }
    }
}
