use crate::audio::TrackDefinition;
use crate::error::BlockError;

/// Info string that marks a fenced block as a track definition.
pub const BLOCK_TAG: &str = "rpg-audio";

const FENCE: &str = "```";

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the body of one block.
///
/// Unknown keys and lines without a colon are skipped. `files:` starts a list
/// of `- item` lines that ends at the first line not starting with `- `.
pub fn parse_block(source: &str) -> Result<TrackDefinition, BlockError> {
    let mut def = TrackDefinition::new("", "", "", Vec::new());
    let mut in_files = false;

    for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if in_files {
            if let Some(item) = line.strip_prefix("- ") {
                let item = item.trim();
                if !item.is_empty() {
                    def.files.push(item.to_string());
                }
                continue;
            }
            in_files = false;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "id" => def.id = value.to_string(),
            "name" => def.name = value.to_string(),
            "type" => def.kind = value.to_string(),
            "loop" => def.looping = flag(value),
            "exclusive" => def.exclusive = flag(value),
            "random" => def.random = flag(value),
            "stops" => def.stops = id_list(value),
            "starts" => def.starts = id_list(value),
            "file" if !value.is_empty() => def.files.push(value.to_string()),
            "files" => in_files = true,
            _ => {}
        }
    }

    if def.id.is_empty() {
        return Err(BlockError::MissingId);
    }
    if def.name.is_empty() {
        return Err(BlockError::MissingName);
    }
    if def.files.is_empty() {
        return Err(BlockError::NoFiles);
    }
    if def.kind.is_empty() {
        def.kind = if def.is_playlist() { "playlist" } else { "sfx" }.to_string();
    }
    Ok(def)
}

/// Bodies of every closed `rpg-audio` block in a note, in order.
pub fn extract_blocks(note: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in note.lines() {
        let trimmed = line.trim();
        match current.as_mut() {
            None => {
                let tagged = trimmed
                    .strip_prefix(FENCE)
                    .is_some_and(|info| info.trim() == BLOCK_TAG);
                if tagged {
                    current = Some(Vec::new());
                }
            }
            Some(body) => {
                if trimmed == FENCE {
                    blocks.push(body.join("\n"));
                    current = None;
                } else {
                    body.push(line);
                }
            }
        }
    }
    blocks
}
