//! Process-pool worker: reads one `WorkerRequest` as JSON on stdin, writes the
//! `WorkerResponse` as JSON on stdout. Logs go to stderr.

use std::io::{self, Read, Write};

use anyhow::Context;
use mimalloc::MiMalloc;

use jobsift::pool::{WorkerRequest, analyze_group};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request from stdin")?;
    let request: WorkerRequest =
        serde_json::from_str(&input).context("failed to parse worker request")?;

    tracing::info!(
        worker_id = %request.worker_id,
        jobs = request.jobs.len(),
        pid = std::process::id(),
        "Worker started"
    );

    let response = analyze_group(request).await;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &response).context("failed to write worker response")?;
    stdout.flush()?;

    Ok(())
}
