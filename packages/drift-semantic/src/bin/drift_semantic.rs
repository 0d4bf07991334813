use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use drift_semantic::application::{
    callgraph_stage, cluster_stage, depcontext_stage, embed_stage, fingerprint_stage, ingest,
    inspect, report_stage, run_stage, score_stage, search, typesig_stage,
};
use drift_semantic::config::{PipelineConfig, DEFAULT_EMBEDDING_MODEL, DEFAULT_OUTPUT_DIR, DEFAULT_THRESHOLD};
use drift_semantic::infrastructure::artifact_store::ArtifactStore;
use drift_semantic::DriftError;

#[derive(Parser)]
#[command(name = "drift-semantic", about = "Semantic drift similarity pipeline")]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: fingerprint, typesig, callgraph, depcontext, score, cluster, report.
    Run {
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        #[arg(long)]
        manifest: Option<PathBuf>,
        #[arg(long, default_value_t = true)]
        parallel: bool,
    },
    Fingerprint,
    Typesig,
    Callgraph,
    Depcontext,
    Score {
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        #[arg(long, default_value_t = true)]
        parallel: bool,
    },
    Cluster {
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },
    Report {
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Embed purpose statements via an Ollama-compatible endpoint.
    Embed {
        #[arg(long)]
        ollama_url: String,
        #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
        model: String,
    },
    IngestPurposes {
        source: PathBuf,
    },
    IngestFindings {
        source: PathBuf,
    },
    Inspect {
        #[command(subcommand)]
        target: InspectTarget,
    },
    Search {
        #[command(subcommand)]
        target: SearchTarget,
    },
}

#[derive(Subcommand)]
enum InspectTarget {
    Unit { id: String },
    Similar { id: String },
    Cluster { id: String },
    Consumers { id: String },
    Callers { id: String },
}

#[derive(Subcommand)]
enum SearchTarget {
    Calls { id: String },
    CalledBy { target: String },
    CoOccursWith { id: String },
    TypeLike { id: String },
}

fn install_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn exit_code_for(err: &DriftError) -> u8 {
    match err {
        DriftError::MissingArtifact { .. } => 2,
        DriftError::Validation { .. } => 3,
        DriftError::EmbeddingEndpointUnreachable { .. } => 4,
        _ => 1,
    }
}

fn main() -> ExitCode {
    install_tracing();
    let cli = Cli::parse();
    let store = ArtifactStore::new(&cli.output_dir);

    let result = dispatch(&cli, &store);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn dispatch(cli: &Cli, store: &ArtifactStore) -> drift_semantic::Result<()> {
    match &cli.command {
        Command::Run {
            threshold,
            manifest,
            parallel,
        } => {
            let config = PipelineConfig {
                output_dir: cli.output_dir.clone(),
                threshold: *threshold,
                parallel: *parallel,
            };
            run_stage::run(store, &config, manifest.as_deref())
        }
        Command::Fingerprint => fingerprint_stage::run(store),
        Command::Typesig => typesig_stage::run(store),
        Command::Callgraph => callgraph_stage::run(store),
        Command::Depcontext => depcontext_stage::run(store),
        Command::Score { threshold, parallel } => {
            let config = PipelineConfig {
                output_dir: cli.output_dir.clone(),
                threshold: *threshold,
                parallel: *parallel,
            };
            score_stage::run(store, &config)
        }
        Command::Cluster { threshold } => {
            let config = PipelineConfig {
                output_dir: cli.output_dir.clone(),
                threshold: *threshold,
                parallel: true,
            };
            cluster_stage::run(store, &config)
        }
        Command::Report { manifest } => report_stage::run(store, manifest.as_deref()),
        Command::Embed { ollama_url, model } => embed_stage::run(store, ollama_url, model),
        Command::IngestPurposes { source } => ingest::ingest_purposes(store, source),
        Command::IngestFindings { source } => ingest::ingest_findings(store, source),
        Command::Inspect { target } => {
            let text = match target {
                InspectTarget::Unit { id } => inspect::unit(store, id),
                InspectTarget::Similar { id } => inspect::similar(store, id),
                InspectTarget::Cluster { id } => inspect::cluster(store, id),
                InspectTarget::Consumers { id } => inspect::consumers(store, id),
                InspectTarget::Callers { id } => inspect::callers(store, id),
            }?;
            println!("{text}");
            Ok(())
        }
        Command::Search { target } => {
            let text = match target {
                SearchTarget::Calls { id } => search::calls(store, id),
                SearchTarget::CalledBy { target } => search::called_by(store, target),
                SearchTarget::CoOccursWith { id } => search::co_occurs_with(store, id),
                SearchTarget::TypeLike { id } => search::type_like(store, id),
            }?;
            println!("{text}");
            Ok(())
        }
    }
}
