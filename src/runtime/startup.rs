use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::audio::{EngineCmd, EngineService, TrackDefinition};
use crate::block::{extract_blocks, parse_block};
use crate::config::VaultSettings;
use crate::error::Result;
use crate::vault::VaultIndex;

/// Every valid track block in the vault's notes, in note order.
///
/// Unreadable notes and invalid blocks are logged and skipped.
pub fn collect_definitions(index: &VaultIndex) -> Vec<TrackDefinition> {
    let mut defs = Vec::new();
    for note in index.notes() {
        let text = match fs::read_to_string(note) {
            Ok(text) => text,
            Err(e) => {
                warn!(note = %note.display(), error = %e, "failed to read note");
                continue;
            }
        };
        for body in extract_blocks(&text) {
            match parse_block(&body) {
                Ok(def) => defs.push(def),
                Err(e) => warn!(note = %note.display(), error = %e, "skipping block"),
            }
        }
    }
    defs
}

/// Keeps the engine's tracks in line with the blocks in the vault.
pub struct Rescanner {
    root: PathBuf,
    settings: VaultSettings,
    known: HashSet<String>,
}

impl Rescanner {
    pub fn new(root: PathBuf, settings: VaultSettings) -> Self {
        Self {
            root,
            settings,
            known: HashSet::new(),
        }
    }

    /// Rescan the vault and push the result to the engine. Returns the number
    /// of track ids now present in notes.
    pub fn rescan(&mut self, service: &EngineService) -> Result<usize> {
        let index = VaultIndex::scan(&self.root, &self.settings);
        for cmd in self.plan(index) {
            service.send(cmd)?;
        }
        info!(tracks = self.known.len(), "vault rescanned");
        Ok(self.known.len())
    }

    /// Commands that bring the engine in line with `index`: swap the file
    /// index, register every block, and detach ids that vanished from notes.
    pub(super) fn plan(&mut self, index: VaultIndex) -> Vec<EngineCmd> {
        let defs = collect_definitions(&index);
        let found: HashSet<String> = defs.iter().map(|d| d.id.clone()).collect();

        let mut gone: Vec<String> = self.known.difference(&found).cloned().collect();
        gone.sort();

        let mut cmds = Vec::with_capacity(defs.len() + gone.len() + 1);
        cmds.push(EngineCmd::Reindex(index));
        cmds.extend(defs.into_iter().map(EngineCmd::Register));
        cmds.extend(gone.into_iter().map(EngineCmd::Detach));

        self.known = found;
        cmds
    }
}
