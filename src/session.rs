//! Per-run pipeline state.
//!
//! Steps ask the session for their prerequisites instead of calling each
//! other directly. Each answer is computed once per run and replayed on
//! later asks, so an install that needs a build that needs a fetch never
//! probes, downloads, or compiles twice.

use anyhow::Result;

use crate::build::{self, BuildOutcome};
use crate::config::PipelineOptions;
use crate::detect::{probe_tool, ToolProbe};
use crate::fetch::{self, FetchOutcome};
use crate::spec::ToolSpec;

pub struct Session {
    spec: ToolSpec,
    opts: PipelineOptions,
    probe: Option<ToolProbe>,
    fetched: Option<FetchOutcome>,
    built: Option<BuildOutcome>,
}

impl Session {
    pub fn new(spec: ToolSpec, opts: PipelineOptions) -> Self {
        Self {
            spec,
            opts,
            probe: None,
            fetched: None,
            built: None,
        }
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.opts
    }

    /// Probe for the tool, at most once per run.
    pub fn probe(&mut self) -> &ToolProbe {
        let name = self.spec.name.clone();
        self.probe.get_or_insert_with(|| probe_tool(&name))
    }

    /// Whether steps may skip their work because the tool already exists.
    /// Force bypasses detection entirely: nothing skips and no probe runs.
    pub fn tool_already_present(&mut self) -> bool {
        if self.opts.force {
            return false;
        }
        self.probe().found
    }

    /// Fetch the source archive, at most once per run.
    pub fn ensure_fetched(&mut self) -> Result<FetchOutcome> {
        if let Some(outcome) = &self.fetched {
            return Ok(outcome.clone());
        }
        let outcome = fetch::fetch(self)?;
        self.fetched = Some(outcome.clone());
        Ok(outcome)
    }

    /// Build the tool from source, at most once per run.
    pub fn ensure_built(&mut self) -> Result<BuildOutcome> {
        if let Some(outcome) = &self.built {
            return Ok(outcome.clone());
        }
        let outcome = build::build(self)?;
        self.built = Some(outcome.clone());
        Ok(outcome)
    }
}
