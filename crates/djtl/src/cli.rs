use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use djtl_conf::Settings;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::DjtlCommand;

/// The main CLI structure that defines the command-line interface
#[derive(Parser)]
#[command(name = "djtl")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: DjtlCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub fn run<I, T>(args: I) -> Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    let project_root = resolve_project_root()?;
    let settings = Settings::new(project_root.as_std_path()).context("Failed to load settings")?;

    crate::logging::init_tracing(&cli.args.global, settings.debug);
    tracing::debug!("Project root: {project_root}");

    let exit = cli.command.execute(&cli.args, &settings)?;
    Ok(exit.report(&cli.args.global))
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}
