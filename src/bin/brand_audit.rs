use anyhow::{Context, Result, bail};
use brandguard::{
    audit::{AuditRequest, AuditService},
    config, logging,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "brand-audit",
    about = "Run one Brand Guardian compliance audit and print the report as JSON"
)]
struct Cli {
    /// Retrieval query; defaults to the video URL.
    #[arg(long)]
    query: Option<String>,
    /// Video under audit.
    #[arg(long)]
    video_url: Option<String>,
    /// Transcript extracted ahead of time.
    #[arg(long)]
    transcript: Option<String>,
    /// OCR line extracted ahead of time; repeat for several lines.
    #[arg(long = "ocr-text")]
    ocr_text: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let request = AuditRequest {
        video_url: cli.video_url,
        query: cli.query,
        transcript: cli.transcript,
        ocr_text: cli.ocr_text,
    };
    if request.subject().is_none() {
        bail!("Provide --query or --video-url");
    }

    let config = config::init_config().context("Failed to load configuration")?;
    logging::init_cli_tracing();
    let service = AuditService::from_config(config).context("Failed to build audit service")?;

    let report = service
        .run_audit(request)
        .await
        .context("Audit did not complete")?;
    let output = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{output}");
    Ok(())
}
