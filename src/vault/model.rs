use std::collections::HashSet;
use std::path::PathBuf;

/// Audio and note files found under a vault root.
///
/// Audio files are keyed by their vault-relative path with `/` separators.
#[derive(Debug, Clone, Default)]
pub struct VaultIndex {
    pub(super) root: PathBuf,
    pub(super) audio: HashSet<String>,
    pub(super) notes: Vec<PathBuf>,
}

impl VaultIndex {
    /// Note files, sorted by path.
    pub fn notes(&self) -> &[PathBuf] {
        &self.notes
    }

    pub fn audio_count(&self) -> usize {
        self.audio.len()
    }

    pub fn contains_audio(&self, relative: &str) -> bool {
        self.audio.contains(relative)
    }
}
