use std::path::PathBuf;

use crate::audio::FileResolver;

use super::model::VaultIndex;

/// Canonical form of a file reference: `/` separators, no leading `./` or `/`,
/// no trailing `/`.
pub fn normalize(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let mut rest = path.as_str();
    loop {
        if let Some(r) = rest.strip_prefix("./") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix('/') {
            rest = r;
        } else {
            break;
        }
    }
    rest.trim_end_matches('/').to_string()
}

impl FileResolver for VaultIndex {
    fn resolve(&self, path: &str, audio_folder: &str) -> Option<PathBuf> {
        let path = normalize(path);
        if path.is_empty() {
            return None;
        }
        if self.contains_audio(&path) {
            return Some(self.root.join(&path));
        }

        let folder = normalize(audio_folder);
        if folder.is_empty() {
            return None;
        }
        let nested = format!("{folder}/{path}");
        self.contains_audio(&nested)
            .then(|| self.root.join(nested))
    }
}
