use std::io::Write as _;

use anyhow::bail;
use anyhow::Context as _;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use djtl_conf::Settings;
use djtl_templates::Context;
use djtl_templates::Engine;
use djtl_templates::Value;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Render {
    /// Template file to render.
    template: Utf8PathBuf,

    /// JSON file holding an object whose keys become template variables.
    #[arg(long, short)]
    context: Option<Utf8PathBuf>,

    /// Extra variable as `key=value`. The value is parsed as JSON when
    /// possible and used as a plain string otherwise.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, Value)>,
}

impl Command for Render {
    fn execute(&self, _args: &Args, settings: &Settings) -> Result<Exit> {
        let source = std::fs::read_to_string(&self.template)
            .with_context(|| format!("Failed to read {}", self.template))?;

        let engine = Engine::new(settings.clone());
        let template = engine
            .compile(&source)
            .with_context(|| format!("Failed to parse {}", self.template))?;

        let mut context = match &self.context {
            Some(path) => load_context(path)?,
            None => Context::new(),
        };
        for (key, value) in &self.vars {
            context.insert(key.as_str(), value.clone());
        }

        let output = template
            .render(&mut context)
            .with_context(|| format!("Failed to render {}", self.template))?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;

        Ok(Exit::success())
    }
}

fn load_context(path: &Utf8Path) -> Result<Context> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {path}"))?;

    match json {
        serde_json::Value::Object(map) => {
            tracing::debug!("Loaded {} context variables from {path}", map.len());
            Ok(Context::from(map))
        }
        _ => bail!("Context file {path} must contain a JSON object"),
    }
}

fn parse_var(s: &str) -> Result<(String, Value), String> {
    let Some((key, raw)) = s.split_once('=') else {
        return Err(format!("expected KEY=VALUE, got `{s}`"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing variable name in `{s}`"));
    }

    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| Value::from(raw), Value::from);
    Ok((key.to_string(), value))
}
