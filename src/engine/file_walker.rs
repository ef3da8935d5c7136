use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

/// Extensions recognised as response captures
const CAPTURE_EXTENSIONS: &[&str] = &["jsonl", "http", "resp", "txt"];

/// Walk a directory tree and collect capture files to scan.
///
/// - Respects .gitignore automatically (via the `ignore` crate), also
///   outside a git checkout
/// - Skips hidden files and directories
/// - Only keeps files with a capture extension
/// - Skips files larger than max_file_size
/// - Applies include/exclude globs
///
/// A single file path is returned as-is. Results are sorted so that
/// responses are consolidated in a stable order.
pub fn walk_captures(
    root: &Path,
    include: &[String],
    exclude: &[String],
    max_file_size: u64,
) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut builder = WalkBuilder::new(root);

    builder
        .hidden(true)          // skip hidden files
        .git_ignore(true)      // respect .gitignore
        .git_global(true)      // respect global gitignore
        .git_exclude(true)     // respect .git/info/exclude
        .require_git(false)    // capture dirs are rarely repositories
        .follow_links(false)   // don't follow symlinks
        .max_filesize(Some(max_file_size));

    // Custom exclude patterns via overrides
    if !exclude.is_empty() {
        let mut overrides = ignore::overrides::OverrideBuilder::new(root);
        for pattern in exclude {
            // Negate the pattern so matching files are excluded
            let neg = format!("!{}", pattern);
            if let Err(e) = overrides.add(&neg) {
                warn!("Invalid exclude pattern '{}': {}", pattern, e);
            }
        }
        if let Ok(built) = overrides.build() {
            builder.overrides(built);
        }
    }

    let include_set = build_include_set(include);
    let mut files = Vec::new();

    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }

                let path = entry.path();
                if !is_capture_file(path) {
                    debug!("Not a capture: {}", path.display());
                    continue;
                }

                if let Some(ref set) = include_set {
                    let rel = path.strip_prefix(root).unwrap_or(path);
                    if !set.is_match(rel) {
                        continue;
                    }
                }

                files.push(path.to_path_buf());
            }
            Err(e) => {
                debug!("Walk error: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Compile include globs; `None` means "include everything"
fn build_include_set(include: &[String]) -> Option<GlobSet> {
    if include.is_empty() {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in include {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!("Invalid include pattern '{}': {}", pattern, e),
        }
    }
    match builder.build() {
        Ok(set) => Some(set),
        Err(e) => {
            warn!("Ignoring include patterns: {}", e);
            None
        }
    }
}

fn is_capture_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| CAPTURE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
