//! Video analysis CLI.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vlens_ml_client::MlClient;
use vlens_models::{AnalysisOutcome, AnalysisResult};
use vlens_pipeline::{PipelineConfig, Providers, VideoAnalyzer};

const ACCEPTED_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

#[derive(Debug, Parser)]
#[command(name = "vlens", version, about = "Analyze a video for speech, scenes, objects and emotions")]
struct Args {
    /// Video file to analyze
    #[arg(required_unless_present = "schema")]
    video: Option<PathBuf>,

    /// Root of debug_outputs/, debug_frames/ and output/
    #[arg(long, env = "VLENS_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Write the result JSON here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the JSON Schema of the result and exit
    #[arg(long)]
    schema: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "vlens=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    // stdout carries the result JSON
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn warn_on_extension(video: &Path) {
    let accepted = video
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);

    if !accepted {
        warn!(
            path = %video.display(),
            "Unexpected video extension, expected one of {:?}",
            ACCEPTED_EXTENSIONS
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.schema {
        let schema = schemars::schema_for!(AnalysisResult);
        println!("{}", to_json(&schema, true)?);
        return Ok(());
    }

    init_tracing();

    let Some(video) = args.video else {
        bail!("a video path is required");
    };
    warn_on_extension(&video);

    let mut config = PipelineConfig::from_env();
    if let Some(base_dir) = args.base_dir {
        config = config.with_base_dir(base_dir);
    }
    info!("Pipeline config: {:?}", config);

    let ml = MlClient::from_env().context("failed to create inference client")?;
    info!(url = ml.base_url(), "Using inference sidecar");

    let analyzer = VideoAnalyzer::new(config.clone(), Providers::production(&config, ml));
    let outcome = analyzer.run(&video).await;
    let json = to_json(&outcome, args.pretty)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, format!("{json}\n"))
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Result written");
        }
        None => println!("{json}"),
    }

    if let AnalysisOutcome::Failed(report) = outcome {
        bail!("{}", report.error);
    }
    Ok(())
}
