//! Write the OpenAPI document as JSON, to stdout or a file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use library_api::doc::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "openapi-dump",
    about = "Print the Library API OpenAPI document",
    version
)]
struct CliArgs {
    /// Write to this path instead of stdout.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit compact JSON.
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let doc = ApiDoc::openapi();
    let json = if args.compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    }
    .wrap_err("failed to serialise OpenAPI document")?;

    match args.output {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("failed to write OpenAPI document to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
