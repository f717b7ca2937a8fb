//! Writes the telemetry API's OpenAPI document.
//!
//! ```text
//! generate_openapi [--server <url>] [--output <path>]
//! ```
//!
//! `--server` records the deployment's base URL in the document's `servers`
//! list. Without `--output` the document goes to stdout.

use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use soil_telemetry::api::handlers::ApiDoc;
use utoipa::{openapi::Server, OpenApi};

#[derive(Debug, Default, PartialEq)]
struct Args {
    server: Option<String>,
    output: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        while let Some(flag) = args.next() {
            let value = args
                .next()
                .with_context(|| format!("{flag} expects a value"))?;
            match flag.as_str() {
                "--server" => parsed.server = Some(value.trim_end_matches('/').to_owned()),
                "--output" => parsed.output = Some(PathBuf::from(value)),
                other => bail!("unknown argument: {other}"),
            }
        }
        Ok(parsed)
    }
}

fn main() -> Result<()> {
    let args = Args::parse(env::args().skip(1))?;

    let mut doc = ApiDoc::openapi();
    if let Some(url) = &args.server {
        doc.servers = Some(vec![Server::new(url)]);
    }
    let json = doc
        .to_pretty_json()
        .context("failed to serialise the OpenAPI document")?;

    match args.output {
        Some(path) => {
            fs::write(&path, &json).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("OpenAPI document written to {}", path.display());
        }
        None => io::stdout()
            .write_all(json.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}
