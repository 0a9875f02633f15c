#![forbid(unsafe_code)]

use clap::{ArgAction, Parser};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mindmark", version, about = "Convert Markdown into a Freeplane mind map")]
struct Cli {
    #[arg(short = 'i', long = "input", value_name = "PATH", default_value = "-")]
    input: String,

    /// Root label used when the document has several top-level blocks.
    #[arg(short = 't', long = "title", value_name = "TITLE")]
    title: Option<String>,

    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Viewer executable, overriding the configured one.
    #[arg(long = "viewer", value_name = "COMMAND")]
    viewer: Option<String>,

    /// Write the map and open it in the viewer.
    #[arg(long = "open")]
    open: bool,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(path: &str) -> mindmark::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: Option<PathBuf>, contents: &str) -> mindmark::Result<()> {
    match path {
        Some(path) => mindmark::viewer::write_map(&path, contents),
        None => {
            print!("{contents}");
            Ok(())
        }
    }
}

fn document_title(cli_title: Option<String>, input: &str, markdown: &str) -> Option<String> {
    cli_title
        .or_else(|| mindmark::read_front_matter(markdown).and_then(|front| front.title))
        .or_else(|| input_stem(input))
}

fn input_stem(input: &str) -> Option<String> {
    if input == "-" {
        return None;
    }
    Path::new(input)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli).inspect_err(|err| tracing::error!("{err}"))
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => mindmark::load_config(path)?,
        None => mindmark::Config::default(),
    };
    if let Some(viewer) = cli.viewer {
        config.viewer = viewer;
    }

    let markdown = read_input(&cli.input)?;
    let title = document_title(cli.title, &cli.input, &markdown);
    let identity = if cli.input == "-" {
        title.clone().unwrap_or_else(|| mindmark::ROOT_LABEL.to_string())
    } else {
        cli.input.clone()
    };
    let options = mindmark::MindmapOptions::new(title, config.extensions);
    let xml = mindmark::convert_markdown_to_mindmap(&markdown, &options);

    if !cli.open {
        write_output(cli.output, &xml)?;
        return Ok(());
    }

    let path = match cli.output {
        Some(path) => {
            mindmark::viewer::write_map(&path, &xml)?;
            path
        }
        None => mindmark::viewer::write_artifact(&config.artifact_dir(), &identity, &xml)?,
    };
    mindmark::viewer::launch_viewer(&config.viewer, &path)?;
    Ok(())
}
