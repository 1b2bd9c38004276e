//! folio - TEI edition publisher

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;

use folio::{RenderOptions, render_document, write_document};

const DEFAULT_THUMBNAIL_WIDTH: u32 = 124;
const DEFAULT_THUMBNAIL_HEIGHT: u32 = 192;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Publish TEI editions as web documents with IIIF manifests", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio -i edition.xml -o build/ -u https://example.com/editions
    folio -i a.xml -i b.xml -o build/ -c project.json")]
struct Cli {
    /// Input TEI XML file (repeat for multiple documents)
    #[arg(short, long = "input", value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for the generated site
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Base URL the site will be served from
    #[arg(short = 'u', long, value_name = "URL")]
    base_url: Option<String>,

    /// Project configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Document identifier (single input only; defaults to the file stem)
    #[arg(long, value_name = "ID")]
    doc_id: Option<String>,

    /// Thumbnail width in the IIIF manifest
    #[arg(long, value_name = "PIXELS")]
    thumbnail_width: Option<u32>,

    /// Thumbnail height in the IIIF manifest
    #[arg(long, value_name = "PIXELS")]
    thumbnail_height: Option<u32>,
}

/// Project-level settings, overridable from the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectConfig {
    #[serde(rename = "baseURL")]
    base_url: Option<String>,
    #[serde(rename = "thumbnailWidth")]
    thumbnail_width: Option<u32>,
    #[serde(rename = "thumbnailHeight")]
    thumbnail_height: Option<u32>,
    #[serde(rename = "glossaryURL")]
    glossary_url: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let base_url = match cli.base_url.clone().or(config.base_url.clone()) {
        Some(u) => u.trim_end_matches('/').to_string(),
        None => {
            eprintln!("error: a base URL is required (-u or \"baseURL\" in the config file)");
            return ExitCode::FAILURE;
        }
    };
    if cli.doc_id.is_some() && cli.inputs.len() > 1 {
        eprintln!("error: --doc-id cannot be combined with multiple inputs");
        return ExitCode::FAILURE;
    }

    let thumbnail_width = cli
        .thumbnail_width
        .or(config.thumbnail_width)
        .unwrap_or(DEFAULT_THUMBNAIL_WIDTH);
    let thumbnail_height = cli
        .thumbnail_height
        .or(config.thumbnail_height)
        .unwrap_or(DEFAULT_THUMBNAIL_HEIGHT);

    let mut failures = 0;
    for input in &cli.inputs {
        let document_id = match &cli.doc_id {
            Some(id) => id.clone(),
            None => match input.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => {
                    eprintln!("error: {}: cannot derive a document id", input.display());
                    failures += 1;
                    continue;
                }
            },
        };
        let options = RenderOptions {
            base_url: base_url.clone(),
            document_id,
            thumbnail_width,
            thumbnail_height,
            glossary_url: config.glossary_url.clone(),
        };
        match process(input, &cli.output, &options) {
            Ok(()) => println!("{} -> {}/{}", input.display(), cli.output.display(), options.document_id),
            Err(e) => {
                eprintln!("error: {}: {e}", input.display());
                failures += 1;
            }
        }
    }

    if failures == cli.inputs.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn load_config(path: Option<&Path>) -> folio::Result<ProjectConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(ProjectConfig::default()),
    }
}

fn process(input: &Path, output: &Path, options: &RenderOptions) -> folio::Result<()> {
    let xml = fs::read_to_string(input)?;
    let document = render_document(&xml, options)?;
    write_document(&document, output)
}
