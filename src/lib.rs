//! Build-step orchestration for wrapped native tools.
//!
//! Ensures a required external binary (by default `patchelf`) is present
//! on the host before whatever depends on it runs. The pipeline decides,
//! in dependency order:
//!
//! - **Detect** - is the tool already on PATH? (memoized per run)
//! - **Fetch** - cache-aware download or bundled copy, sha256-verified
//! - **Build** - clean extraction, `./configure [--prefix]`, `make`
//! - **Install** - `make install` plus the declared artifact manifest
//!
//! Steps short-circuit when the tool is already installed (unless
//! forced), reuse a checksum-valid cached archive instead of touching
//! the network, and under dry-run report their decisions without
//! touching the filesystem or running anything beyond the probe.
//!
//! # Example
//!
//! ```rust,no_run
//! use tool_builder::{pipeline, Action, PipelineOptions, Session, ToolSpec};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut session = Session::new(ToolSpec::patchelf(), PipelineOptions::default());
//!     let outcome = pipeline::run(Action::Install, &mut session)?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod build;
pub mod checksum;
pub mod clean;
pub mod config;
pub mod detect;
pub mod fetch;
pub mod install;
pub mod pipeline;
pub mod process;
pub mod session;
pub mod spec;

#[cfg(test)]
pub(crate) mod testsupport;

pub use build::BuildOutcome;
pub use config::PipelineOptions;
pub use detect::ToolProbe;
pub use fetch::FetchOutcome;
pub use install::{InstallManifest, InstallOutcome};
pub use pipeline::{Action, ActionOutcome};
pub use session::Session;
pub use spec::{ArchiveSource, ToolSpec};
