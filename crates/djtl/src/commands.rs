mod check;
mod render;

use anyhow::Result;
use clap::Subcommand;
use djtl_conf::Settings;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args, settings: &Settings) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum DjtlCommand {
    /// Render a template to stdout
    Render(self::render::Render),
    /// Parse templates and report syntax errors
    Check(self::check::Check),
}

impl Command for DjtlCommand {
    fn execute(&self, args: &Args, settings: &Settings) -> Result<Exit> {
        match self {
            DjtlCommand::Render(cmd) => cmd.execute(args, settings),
            DjtlCommand::Check(cmd) => cmd.execute(args, settings),
        }
    }
}
