//! Pipeline options shared by every step.

use std::path::PathBuf;

/// Options every step receives and must honor identically.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Skip detection and always rebuild/reinstall. A valid cached
    /// archive is still reused; force does not mean re-download.
    pub force: bool,
    /// Reuse whatever build tree already exists instead of building.
    /// Only install consults this.
    pub skip_build: bool,
    /// Compute and report decisions without touching the filesystem,
    /// the network, or any subprocess.
    pub dry_run: bool,
    /// Where fetched archives are cached across runs.
    pub download_dir: PathBuf,
    /// Root under which the tool's source tree is unpacked and built.
    pub build_dir: PathBuf,
    /// Passed to `./configure --prefix`; also roots the install
    /// manifest. `None` leaves configure at its built-in default.
    pub install_prefix: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            force: false,
            skip_build: false,
            dry_run: false,
            download_dir: default_download_dir(),
            build_dir: PathBuf::from("build"),
            install_prefix: None,
        }
    }
}

impl PipelineOptions {
    /// Prefix the install manifest is rooted at when none was configured
    /// (the autotools default install target).
    pub fn effective_prefix(&self) -> PathBuf {
        self.install_prefix
            .clone()
            .unwrap_or_else(|| PathBuf::from("/usr/local"))
    }
}

/// Default archive cache, `~/.cache/tool-builder/downloads`.
fn default_download_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("tool-builder")
        .join("downloads")
}
