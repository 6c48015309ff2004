//! Action dispatch: one pipeline, four entry points.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::build::BuildOutcome;
use crate::detect::ToolProbe;
use crate::fetch::FetchOutcome;
use crate::install::{self, InstallOutcome};
use crate::session::Session;

/// Top-level pipeline actions, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Detect,
    Fetch,
    Build,
    Install,
}

impl Action {
    pub fn parse(word: &str) -> Result<Self> {
        match word {
            "detect" => Ok(Self::Detect),
            "fetch" => Ok(Self::Fetch),
            "build" => Ok(Self::Build),
            "install" => Ok(Self::Install),
            other => bail!(
                "Unknown action '{}'. Expected one of: detect, fetch, build, install",
                other
            ),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub enum ActionOutcome {
    Detected(ToolProbe),
    Fetched(FetchOutcome),
    Built(BuildOutcome),
    Installed(InstallOutcome),
}

/// Run `action` plus everything it depends on.
///
/// Dependencies flow install -> build -> fetch, with detection consulted
/// at each step; the session replays memoized answers, so asking for a
/// later action never repeats an earlier one within the same run.
pub fn run(action: Action, session: &mut Session) -> Result<ActionOutcome> {
    match action {
        Action::Detect => Ok(ActionOutcome::Detected(session.probe().clone())),
        Action::Fetch => Ok(ActionOutcome::Fetched(session.ensure_fetched()?)),
        Action::Build => Ok(ActionOutcome::Built(session.ensure_built()?)),
        Action::Install => Ok(ActionOutcome::Installed(install::install(session)?)),
    }
}
