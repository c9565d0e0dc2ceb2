use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use djtl_conf::Settings;
use djtl_templates::Engine;
use djtl_templates::TemplateError;
use ignore::WalkBuilder;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;

const TEMPLATE_EXTENSIONS: &[&str] = &["html", "htm", "djhtml", "txt", "xml"];

#[derive(Debug, Parser)]
pub struct Check {
    /// Template files or directories to check.
    #[arg(required = true)]
    paths: Vec<Utf8PathBuf>,
}

impl Command for Check {
    fn execute(&self, args: &Args, settings: &Settings) -> Result<Exit> {
        let engine = Engine::new(settings.clone());
        let files = discover_files(&self.paths);
        tracing::debug!("Checking {} files", files.len());

        let mut failures: usize = 0;
        for path in &files {
            if let Err(message) = check_file(&engine, path) {
                failures += 1;
                if !args.global.quiet {
                    println!("{path}: {message}");
                }
            }
        }

        if failures > 0 {
            let file_word = if files.len() == 1 { "file" } else { "files" };
            Ok(Exit::error().with_message(format!(
                "Found errors in {failures} of {} {file_word}.",
                files.len()
            )))
        } else {
            tracing::info!("All {} files parsed cleanly", files.len());
            Ok(Exit::success())
        }
    }
}

fn check_file(engine: &Engine, path: &Utf8Path) -> Result<(), String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("failed to read: {e}"))?;
    engine
        .compile(&source)
        .map(|_| ())
        .map_err(|e: TemplateError| e.to_string())
}

/// Expand `paths` into template files. Explicit files are taken as given;
/// directories are walked respecting ignore files and skipping hidden entries.
fn discover_files(paths: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            tracing::warn!("Skipping {path}: not a file or directory");
            continue;
        }

        for entry in WalkBuilder::new(path.as_std_path()).build().flatten() {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Ok(file) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
                continue;
            };
            if is_template(&file) {
                files.push(file);
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn is_template(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}
