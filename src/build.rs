//! Build step: clean extraction, configure, compile.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::clean::clean_build_tree;
use crate::fetch::FetchOutcome;
use crate::process::{Cmd, Pushd};
use crate::session::Session;

/// What build did, or under dry-run would have done.
#[derive(Debug, Clone, Serialize)]
pub enum BuildOutcome {
    /// The tool is already installed; nothing was built.
    SkippedToolPresent,
    /// The source tree was configured and compiled in place.
    Built { source_dir: PathBuf },
    /// Dry-run: prerequisites were decided, nothing was touched.
    WouldBuild,
}

/// Compile the tool from its source archive.
///
/// Runs the classic autotools dance: unpack into a clean tree under the
/// build dir, `./configure` (with `--prefix` when configured), `make`.
/// A failed configure or make leaves the tree in place for inspection.
pub fn build(session: &mut Session) -> Result<BuildOutcome> {
    if session.tool_already_present() {
        return Ok(BuildOutcome::SkippedToolPresent);
    }

    let archive = match session.ensure_fetched()? {
        FetchOutcome::SkippedToolPresent => return Ok(BuildOutcome::SkippedToolPresent),
        FetchOutcome::CacheHit { archive }
        | FetchOutcome::Fetched { archive }
        | FetchOutcome::WouldFetch { archive } => archive,
    };

    if session.options().dry_run {
        return Ok(BuildOutcome::WouldBuild);
    }

    let build_dir = session.options().build_dir.clone();
    let source_name = session.spec().source_dir_name();
    let prefix = session.options().install_prefix.clone();

    fs::create_dir_all(&build_dir)
        .with_context(|| format!("Failed to create build directory {}", build_dir.display()))?;

    // Stale trees from an earlier archive would shadow freshly
    // extracted files.
    clean_build_tree(&build_dir, &source_name)?;

    println!(
        "Extracting {} to {}",
        archive.display(),
        build_dir.display()
    );
    extract_archive(&archive, &build_dir)?;

    let source_dir = build_dir.join(&source_name);
    if !source_dir.is_dir() {
        bail!(
            "Archive {} did not unpack to the expected {} directory",
            archive.display(),
            source_name
        );
    }

    let _tree = Pushd::enter(&source_dir)?;

    let mut configure = Cmd::new("./configure");
    if let Some(prefix) = &prefix {
        let prefix_arg = prefix.display().to_string();
        configure = configure.args(["--prefix", prefix_arg.as_str()]);
    }
    println!("Configuring: {}", configure.describe());
    configure.error_msg("configure failed").run_interactive()?;

    println!("Building...");
    Cmd::new("make")
        .error_msg("make failed")
        .run_interactive()?;

    Ok(BuildOutcome::Built { source_dir })
}

/// Unpack a source archive into `dest`, choosing the codec by extension.
fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let file =
        File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    let reader = BufReader::new(file);

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        unpack_tar(flate2::read::GzDecoder::new(reader), archive, dest)
    } else if name.ends_with(".tar.zst") {
        let decoder = zstd::stream::Decoder::new(reader)?;
        unpack_tar(decoder, archive, dest)
    } else if name.ends_with(".tar") {
        unpack_tar(reader, archive, dest)
    } else {
        bail!("Unsupported archive format: {}", archive.display());
    }
}

fn unpack_tar<R: Read>(reader: R, archive: &Path, dest: &Path) -> Result<()> {
    let mut tar = tar::Archive::new(reader);
    tar.unpack(dest)
        .with_context(|| format!("Failed to unpack {}", archive.display()))?;
    Ok(())
}
