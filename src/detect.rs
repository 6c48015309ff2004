//! Host probe for an already-installed tool.

use serde::Serialize;
use std::path::PathBuf;

/// Result of probing the search path for the wrapped tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolProbe {
    pub found: bool,
    pub path: Option<PathBuf>,
}

/// Look the tool up on PATH.
///
/// Any lookup failure counts as "not installed" rather than an error;
/// the missing tool is the expected case this crate exists for, and the
/// pipeline answers it by building one.
pub fn probe_tool(name: &str) -> ToolProbe {
    match which::which(name) {
        Ok(path) => {
            println!("Found {} at {}", name, path.display());
            ToolProbe {
                found: true,
                path: Some(path),
            }
        }
        Err(_) => {
            println!("{} not found on PATH", name);
            ToolProbe {
                found: false,
                path: None,
            }
        }
    }
}
