//! Archive acquisition: cache reuse, download (or bundled copy), and
//! integrity verification.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::checksum::{file_digest_matches, verify_file};
use crate::session::Session;
use crate::spec::ArchiveSource;

/// What fetch did, or under dry-run would have done.
#[derive(Debug, Clone, Serialize)]
pub enum FetchOutcome {
    /// The tool is already installed; nothing was fetched.
    SkippedToolPresent,
    /// A checksum-valid archive was already cached.
    CacheHit { archive: PathBuf },
    /// The archive was downloaded (or copied) into the cache and verified.
    Fetched { archive: PathBuf },
    /// Dry-run: the archive would have been fetched to this path.
    WouldFetch { archive: PathBuf },
}

/// Ensure the spec's archive sits in the cache with a matching digest.
///
/// An installed tool short-circuits the whole step (unless forced). A
/// cached archive is reused only when its digest matches; a corrupt one
/// is fetched again over the top. A digest mismatch after fetching is
/// fatal, before anything downstream extracts the file.
pub fn fetch(session: &mut Session) -> Result<FetchOutcome> {
    if session.tool_already_present() {
        return Ok(FetchOutcome::SkippedToolPresent);
    }

    let archive = cache_path(session);
    let expected = session.spec().sha256.clone();

    if archive.is_file() && file_digest_matches(&archive, &expected)? {
        println!("Using cached {}", archive.display());
        return Ok(FetchOutcome::CacheHit { archive });
    }

    if session.options().dry_run {
        return Ok(FetchOutcome::WouldFetch { archive });
    }

    let download_dir = session.options().download_dir.clone();
    fs::create_dir_all(&download_dir).with_context(|| {
        format!(
            "Failed to create download directory {}",
            download_dir.display()
        )
    })?;

    match session.spec().source.clone() {
        ArchiveSource::Remote { url } => {
            println!("Downloading {}...", url);
            download(&url, &archive)?;
        }
        ArchiveSource::Bundled { path } => {
            println!("Copying {}...", path.display());
            fs::copy(&path, &archive).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    path.display(),
                    archive.display()
                )
            })?;
        }
    }

    verify_file(&archive, &expected)?;
    Ok(FetchOutcome::Fetched { archive })
}

fn cache_path(session: &Session) -> PathBuf {
    session
        .options()
        .download_dir
        .join(session.spec().archive_file_name())
}

fn download(url: &str, dest: &Path) -> Result<()> {
    let mut response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to download {}", url))?;
    if !response.status().is_success() {
        bail!("Download of {} failed: HTTP {}", url, response.status());
    }

    let mut out =
        File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    io::copy(&mut response, &mut out)
        .with_context(|| format!("Failed to write {}", dest.display()))?;
    Ok(())
}
