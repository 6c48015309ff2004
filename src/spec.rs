//! Tool specs: what to provision and where its source comes from.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum::is_sha256_hex;

/// Where a tool's source archive comes from.
#[derive(Debug, Clone)]
pub enum ArchiveSource {
    /// Download from a URL.
    Remote { url: String },
    /// Copy a tarball already on disk (air-gapped installs, vendored
    /// sources). No network involved.
    Bundled { path: PathBuf },
}

/// Static description of the tool a pipeline run provisions.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub version: String,
    pub source: ArchiveSource,
    /// Expected sha256 of the archive, lowercase or uppercase hex.
    pub sha256: String,
}

impl ToolSpec {
    /// The patchelf release provisioned when no spec file is given.
    pub fn patchelf() -> Self {
        Self {
            name: "patchelf".to_string(),
            version: "0.9".to_string(),
            source: ArchiveSource::Remote {
                url: "https://nixos.org/releases/patchelf/patchelf-0.9/patchelf-0.9.tar.gz"
                    .to_string(),
            },
            sha256: "f2aa40a6148cb3b0ca807a1bf836b081793e55ec9e5540a5356d800132be7e0a"
                .to_string(),
        }
    }

    /// Directory the archive is expected to unpack to: `<name>-<version>`.
    pub fn source_dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Basename the archive is cached under (derived from the URL or the
    /// bundled file name).
    pub fn archive_file_name(&self) -> String {
        match &self.source {
            ArchiveSource::Remote { url } => url
                .rsplit('/')
                .next()
                .unwrap_or(url)
                .to_string(),
            ArchiveSource::Bundled { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("{}.tar.gz", self.source_dir_name())),
        }
    }

    /// Load a spec from a TOML file with a single `[tool]` table.
    ///
    /// A relative `archive` path is resolved against the spec file's
    /// directory, so spec files can sit next to their vendored tarballs.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading tool spec '{}'", path.display()))?;
        let parsed: SpecToml = toml::from_str(&raw)
            .with_context(|| format!("parsing tool spec '{}'", path.display()))?;
        let tool = parsed.tool;

        if tool.name.trim().is_empty() || tool.name.contains('/') {
            bail!(
                "invalid tool spec '{}': name must be a plain file-name segment",
                path.display()
            );
        }
        if tool.version.trim().is_empty() || tool.version.contains('/') {
            bail!(
                "invalid tool spec '{}': version must be a plain file-name segment",
                path.display()
            );
        }
        if !is_sha256_hex(&tool.sha256) {
            bail!(
                "invalid tool spec '{}': sha256 must be 64 hex chars, got '{}'",
                path.display(),
                tool.sha256
            );
        }

        let source = match (tool.url, tool.archive) {
            (Some(url), None) => {
                let basename = url.rsplit('/').next().unwrap_or("");
                if basename.is_empty() {
                    bail!(
                        "invalid tool spec '{}': url '{}' has no file name to cache under",
                        path.display(),
                        url
                    );
                }
                ArchiveSource::Remote { url }
            }
            (None, Some(archive)) => {
                let archive = if archive.is_absolute() {
                    archive
                } else {
                    path.parent().unwrap_or_else(|| Path::new(".")).join(archive)
                };
                ArchiveSource::Bundled { path: archive }
            }
            (Some(_), Some(_)) => bail!(
                "invalid tool spec '{}': url and archive are mutually exclusive",
                path.display()
            ),
            (None, None) => bail!(
                "invalid tool spec '{}': one of url or archive is required",
                path.display()
            ),
        };

        Ok(Self {
            name: tool.name,
            version: tool.version,
            source,
            sha256: tool.sha256,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecToml {
    tool: ToolToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolToml {
    name: String,
    version: String,
    sha256: String,
    url: Option<String>,
    archive: Option<PathBuf>,
}
