use std::path::PathBuf;

use anyhow::{bail, Result};
use tool_builder::{
    pipeline, Action, ActionOutcome, BuildOutcome, FetchOutcome, InstallOutcome, PipelineOptions,
    Session, ToolSpec,
};

fn usage() -> &'static str {
    "Usage:\n  tool-builder <detect|fetch|build|install> [options]\n\nOptions:\n  --force               always rebuild and reinstall, even if the tool is present\n  --skip-build          install from the existing build tree (install only)\n  --dry-run             report decisions without downloading, building or installing\n  --download-dir <dir>  archive cache directory (default: ~/.cache/tool-builder/downloads)\n  --build-dir <dir>     build tree root (default: ./build)\n  --prefix <dir>        install prefix passed to configure\n  --spec <file>         TOML tool spec with a [tool] table (default: built-in patchelf)\n  --json                print the outcome as JSON"
}

struct Invocation {
    options: PipelineOptions,
    spec_file: Option<PathBuf>,
    json: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((action_word, rest)) = args.split_first() else {
        bail!(usage());
    };

    let action = Action::parse(action_word)?;
    let invocation = parse_options(rest)?;

    let spec = match &invocation.spec_file {
        Some(path) => ToolSpec::from_toml_file(path)?,
        None => ToolSpec::patchelf(),
    };

    let mut session = Session::new(spec, invocation.options);
    let outcome = pipeline::run(action, &mut session)?;
    report(&outcome, invocation.json)
}

fn parse_options(args: &[String]) -> Result<Invocation> {
    let mut options = PipelineOptions::default();
    let mut spec_file = None;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--force" => options.force = true,
            "--skip-build" => options.skip_build = true,
            "--dry-run" => options.dry_run = true,
            "--json" => json = true,
            "--download-dir" => options.download_dir = value_for(arg, &mut iter)?,
            "--build-dir" => options.build_dir = value_for(arg, &mut iter)?,
            "--prefix" => options.install_prefix = Some(value_for(arg, &mut iter)?),
            "--spec" => spec_file = Some(value_for(arg, &mut iter)?),
            other => bail!("unknown option '{}'\n\n{}", other, usage()),
        }
    }

    Ok(Invocation {
        options,
        spec_file,
        json,
    })
}

fn value_for(flag: &str, iter: &mut std::slice::Iter<'_, String>) -> Result<PathBuf> {
    match iter.next() {
        Some(value) => Ok(PathBuf::from(value)),
        None => bail!("{} requires a value\n\n{}", flag, usage()),
    }
}

fn report(outcome: &ActionOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        ActionOutcome::Detected(probe) => match &probe.path {
            Some(path) => println!("[detect] installed at {}", path.display()),
            None => println!("[detect] not installed"),
        },
        ActionOutcome::Fetched(fetched) => match fetched {
            FetchOutcome::SkippedToolPresent => {
                println!("[fetch] tool already installed; nothing to fetch")
            }
            FetchOutcome::CacheHit { archive } => {
                println!("[fetch] cached archive is valid: {}", archive.display())
            }
            FetchOutcome::Fetched { archive } => {
                println!("[fetch] archive verified: {}", archive.display())
            }
            FetchOutcome::WouldFetch { archive } => {
                println!("[fetch] dry-run; would fetch {}", archive.display())
            }
        },
        ActionOutcome::Built(built) => match built {
            BuildOutcome::SkippedToolPresent => {
                println!("[build] tool already installed; nothing to build")
            }
            BuildOutcome::Built { source_dir } => {
                println!("[build] built in {}", source_dir.display())
            }
            BuildOutcome::WouldBuild => println!("[build] dry-run; would build from source"),
        },
        ActionOutcome::Installed(installed) => match installed {
            InstallOutcome::SkippedToolPresent => {
                println!("[install] tool already installed; nothing to install")
            }
            InstallOutcome::Installed { manifest } => {
                println!("[install] installed:");
                for file in &manifest.files {
                    println!("  {}", file.display());
                }
            }
            InstallOutcome::WouldInstall { .. } => {
                println!("[install] dry-run; nothing installed")
            }
        },
    }

    Ok(())
}
