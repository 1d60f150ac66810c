use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use ollex::archive;
use ollex::error::{ExportError, Result};
use ollex::export::{ExportDriver, ExportSummary};
use ollex::store::StoreLayout;

#[derive(Parser)]
#[command(name = "ollex")]
#[command(about = "Export models from a local Ollama store into a portable archive", long_about = None)]
struct Cli {
    /// Models to export as name[:tag]; exports every model when omitted
    models: Vec<String>,

    /// Ollama model store root (defaults to $OLLAMA_MODELS or ~/.ollama/models)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Directory to build the export tree in
    #[arg(short, long, default_value = "ollama-export")]
    output: PathBuf,

    /// Archive file to write
    #[arg(long, default_value = "ollama-export.tar.gz")]
    archive: PathBuf,

    /// Skip compressing the export tree
    #[arg(long)]
    no_archive: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(&cli) {
        Ok(summary) if summary.models_processed == 0 && !summary.failed.is_empty() => {
            eprintln!("No models were exported");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExportSummary> {
    let source_root = match &cli.source {
        Some(dir) => dir.clone(),
        None => default_store_root()?,
    };

    // Fail fast with a clear message before touching the output tree
    for dir in ["manifests", "blobs"] {
        let path = source_root.join(dir);
        if !path.is_dir() {
            return Err(ExportError::CatalogNotFound(path.display().to_string()));
        }
    }
    tracing::debug!("Source store verified at {}", source_root.display());

    // Destination mirrors the store layout under <output>/models, matching
    // what .ollama/ expects on the import side
    let dest_root = cli.output.join("models");
    fs::create_dir_all(dest_root.join("manifests/registry.ollama.ai/library"))?;
    fs::create_dir_all(dest_root.join("blobs"))?;

    let driver = ExportDriver::new(StoreLayout::new(source_root), StoreLayout::new(&dest_root));

    if cli.models.is_empty() {
        println!("Exporting all available models");
    } else {
        println!("Exporting specified models: {}", cli.models.join(" "));
    }

    let summary = driver.run(&cli.models)?;

    println!(
        "Exported {} model(s), {} blob(s)",
        summary.models_processed, summary.blobs_copied
    );
    if !summary.failed.is_empty() {
        eprintln!("{} model(s) failed to export:", summary.failed.len());
        for (reference, cause) in &summary.failed {
            eprintln!("  {reference}: {cause}");
        }
    }

    if summary.models_processed > 0 && !cli.no_archive {
        println!("Compressing export...");
        archive::compress(&cli.output, &cli.archive)?;
        print_import_instructions(&cli.archive);
    }

    Ok(summary)
}

/// Default store root: $OLLAMA_MODELS if set, otherwise ~/.ollama/models
fn default_store_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("OLLAMA_MODELS") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".ollama").join("models"))
        .ok_or_else(|| {
            ExportError::Other(
                "Could not determine home directory; pass --source explicitly".to_string(),
            )
        })
}

fn print_import_instructions(archive: &Path) {
    println!("===================================================");
    println!("Export completed: {}", archive.display());
    println!("To import on the destination system:");
    println!(
        "1. Decompress with: tar -xzvf {} -C /destination/path",
        archive.display()
    );
    println!("2. Copy the files to the Docker container: docker cp /destination/path/. [ollama-container]:/root/.ollama/");
    println!("3. Restart the container: docker restart [ollama-container]");
    println!("===================================================");
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
