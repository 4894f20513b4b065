use crate::paths::JobPaths;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Output suffixes moved from the output directory back to the source
/// directory after each pass: the document itself and its SyncTeX companion.
const RELOCATED_SUFFIXES: &[&str] = &["pdf", "synctex.gz"];

/// Moves finished outputs next to the source file.
///
/// Outputs the engine did not produce (e.g. no PDF after a fatal error) are
/// skipped. Returns the destinations of the files actually moved. Operates
/// purely on the file system; never consults or affects the parsed report.
pub fn relocate_outputs(paths: &JobPaths) -> io::Result<Vec<PathBuf>> {
    let mut moved = Vec::new();
    for suffix in RELOCATED_SUFFIXES {
        let name = format!("{}.{}", paths.stem, suffix);
        let from = paths.out_dir.join(&name);
        if !from.is_file() {
            continue;
        }
        let to = paths.base_dir.join(&name);
        move_file(&from, &to)?;
        log::debug!("moved {} -> {}", from.display(), to.display());
        moved.push(to);
    }
    Ok(moved)
}

/// Rename, falling back to copy+remove when source and destination sit on
/// different file systems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
