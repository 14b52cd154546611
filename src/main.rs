//! aetrace CLI: trace semantic paths from a drug to adverse effects

use aetrace::embed::{EncoderProvider, HttpEncoder};
use aetrace::reason::{ArtifactPaths, PathReasoner, ReasonerConfig};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "aetrace",
    version,
    about = "Trace semantic paths from a drug to adverse effects across evidence and ontology graphs"
)]
struct Cli {
    /// Drug name (e.g., "metformin")
    #[arg(long)]
    drug: String,

    /// Adverse-effect terms (e.g., --ae nausea --ae vomiting)
    #[arg(long = "ae", required = true, num_args = 1..)]
    aes: Vec<String>,

    /// Base directory holding the persisted artifacts
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Terminology directory (default: <data-dir>/terminology)
    #[arg(long)]
    terminology: Option<PathBuf>,

    /// Evidence graph artifact (default: <data-dir>/evidence_graph.bin)
    #[arg(long)]
    evidence_graph: Option<PathBuf>,

    /// Ontology graph artifact (default: <data-dir>/ontology_graph.bin)
    #[arg(long)]
    ontology_graph: Option<PathBuf>,

    /// Concept index artifact (default: <data-dir>/concept_index.bin)
    #[arg(long)]
    index: Option<PathBuf>,

    /// Concept label list artifact (default: <data-dir>/concept_labels.bin)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Neighbors requested per bridged label
    #[arg(long, default_value_t = 5)]
    neighbors: usize,

    /// Minimum similarity for a bridge to be retained
    #[arg(long, default_value_t = 0.7)]
    threshold: f32,

    /// Ranked chains kept after scoring
    #[arg(long, default_value_t = 5)]
    max_paths: usize,

    /// Fallback entries per channel
    #[arg(long, default_value_t = 3)]
    max_fallback: usize,

    /// Embedding service flavor
    #[arg(long, value_enum, default_value = "ollama")]
    embed_provider: ProviderArg,

    /// Embedding service base URL (defaults per provider)
    #[arg(long)]
    embed_url: Option<String>,

    /// Embedding model name
    #[arg(long, default_value = "sapbert")]
    embed_model: String,

    /// API key for OpenAI-style embedding services
    #[arg(long, env = "AETRACE_EMBED_API_KEY")]
    embed_api_key: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ProviderArg {
    Ollama,
    Openai,
}

impl From<ProviderArg> for EncoderProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Ollama => EncoderProvider::Ollama,
            ProviderArg::Openai => EncoderProvider::OpenAi,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    info!("Running drug-AE path reasoning for drug: {}", cli.drug);
    info!("Input AE terms: {:?}", cli.aes);

    let mut paths = ArtifactPaths::from_data_dir(&cli.data_dir);
    if let Some(dir) = cli.terminology {
        paths.terminology_dir = dir;
    }
    if let Some(path) = cli.evidence_graph {
        paths.evidence_graph = path;
    }
    if let Some(path) = cli.ontology_graph {
        paths.ontology_graph = path;
    }
    if let Some(path) = cli.index {
        paths.concept_index = path;
    }
    if let Some(path) = cli.labels {
        paths.concept_labels = path;
    }

    let encoder = HttpEncoder::new(
        cli.embed_provider.into(),
        cli.embed_url,
        cli.embed_model,
        cli.embed_api_key,
    )
    .context("configuring embedding client")?;

    let config = ReasonerConfig {
        neighbors: cli.neighbors,
        similarity_floor: cli.threshold,
        max_paths: cli.max_paths,
        max_fallback: cli.max_fallback,
    };

    let reasoner =
        PathReasoner::load(&paths, Box::new(encoder), config).context("loading artifacts")?;
    let outcome = reasoner.query(&cli.drug, &cli.aes)?;

    if outcome.fully_connected {
        info!("Found {} real path(s)", outcome.ranked.len());
    } else {
        info!("No real paths found; showing fallback paths instead");
        info!(
            "Fallbacks from drug side: {} | term side: {}",
            outcome.drug_fallback.len(),
            outcome.term_fallback.len()
        );
    }

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            println!("--- Reasoning paths ---");
            println!();
            for narrative in &outcome.narratives {
                println!("{}", narrative);
            }
        }
    }

    Ok(())
}
