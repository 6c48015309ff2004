//! Streaming SHA-256 digests for archive verification.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Compute the SHA-256 digest of a file as lowercase hex.
///
/// Reads through a fixed-size buffer so archives hash in bounded memory
/// regardless of size.
pub fn sha256_file(path: &Path) -> Result<String> {
    let f = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut r = BufReader::new(f);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = r
            .read(&mut buf)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Quiet comparison for cache-validity checks. Hex case is ignored.
pub fn file_digest_matches(path: &Path, expected: &str) -> Result<bool> {
    let actual = sha256_file(path)?;
    Ok(actual.eq_ignore_ascii_case(expected))
}

/// Verify a file against an expected digest.
///
/// A mismatch is fatal and reports both digests; callers rely on this
/// running before anything extracts or installs the file.
pub fn verify_file(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        bail!(
            "Checksum mismatch for {}\n  expected: {}\n  actual:   {}",
            path.display(),
            expected,
            actual
        );
    }
    Ok(())
}

/// Whether `s` is a plausible sha256 digest (64 hex chars).
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}
