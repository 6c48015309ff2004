//! Build-tree cleanup between builds.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Remove `<build_dir>/<dir_name>` recursively.
///
/// A missing tree is fine; a build that never ran has nothing to clean.
/// Used before extraction (stale trees from older archives) and after a
/// successful install (the tree has served its purpose).
pub fn clean_build_tree(build_dir: &Path, dir_name: &str) -> Result<()> {
    let tree = build_dir.join(dir_name);
    if !tree.exists() {
        return Ok(());
    }

    println!("Cleaning {}", tree.display());
    fs::remove_dir_all(&tree)
        .with_context(|| format!("Failed to remove build tree {}", tree.display()))?;
    Ok(())
}
