//! Install step: native `make install` plus the reported artifact manifest.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::BuildOutcome;
use crate::clean::clean_build_tree;
use crate::process::{Cmd, Pushd};
use crate::session::Session;

/// Ordered list of files the install is declared to have produced.
///
/// The paths follow the conventional autotools layout under the install
/// prefix. The native install's actual output is not inspected, so a
/// tool whose upstream layout diverges will be misreported here; the
/// declared layout matches what patchelf ships.
#[derive(Debug, Clone, Serialize)]
pub struct InstallManifest {
    pub files: Vec<PathBuf>,
}

impl InstallManifest {
    fn for_prefix(prefix: &Path, tool: &str) -> Self {
        Self {
            files: vec![
                prefix.join("bin").join(tool),
                prefix.join("share/doc").join(tool).join("README"),
                prefix.join("share/man/man1").join(format!("{}.1", tool)),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { files: vec![] }
    }
}

/// What install did, or under dry-run would have done.
#[derive(Debug, Clone, Serialize)]
pub enum InstallOutcome {
    /// The tool is already installed; nothing was done.
    SkippedToolPresent,
    /// The native install ran to completion.
    Installed { manifest: InstallManifest },
    /// Dry-run: nothing was installed and the manifest is empty.
    WouldInstall { manifest: InstallManifest },
}

/// Run the tool's native install out of its built source tree.
///
/// Builds first unless `skip_build` asked for the tree as-is. On
/// success the tree is cleaned away; on failure it stays put, exactly
/// like a failed build.
pub fn install(session: &mut Session) -> Result<InstallOutcome> {
    if session.tool_already_present() {
        return Ok(InstallOutcome::SkippedToolPresent);
    }

    if !session.options().skip_build {
        if let BuildOutcome::SkippedToolPresent = session.ensure_built()? {
            return Ok(InstallOutcome::SkippedToolPresent);
        }
    }

    if session.options().dry_run {
        return Ok(InstallOutcome::WouldInstall {
            manifest: InstallManifest::empty(),
        });
    }

    let build_dir = session.options().build_dir.clone();
    let source_name = session.spec().source_dir_name();
    let source_dir = build_dir.join(&source_name);

    // Under skip-build the tree may not exist. Create it anyway and let
    // the native install be the one to complain about what is missing.
    fs::create_dir_all(&source_dir)
        .with_context(|| format!("Failed to create build tree {}", source_dir.display()))?;

    {
        let _tree = Pushd::enter(&source_dir)?;
        println!("Installing {}...", session.spec().name);
        Cmd::new("make")
            .arg("install")
            .error_msg("make install failed")
            .run_interactive()?;
        // Leave the tree before removing it.
    }

    let manifest = InstallManifest::for_prefix(
        &session.options().effective_prefix(),
        &session.spec().name,
    );

    clean_build_tree(&build_dir, &source_name)?;

    Ok(InstallOutcome::Installed { manifest })
}
