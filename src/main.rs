// =============================================================================
// Tension Replay — Main Entry Point
// =============================================================================
//
// Reads newline-delimited JSON tick frames from a file (first argument) or
// stdin, drives a TensionMonitor, and prints one JSON snapshot per frame on
// stdout. Logs go to stderr.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tension_engine::{EngineConfig, TensionMonitor, TickFrame};

const DEFAULT_CONFIG_PATH: &str = "tension_config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("TENSION_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // ── 2. Build engines ─────────────────────────────────────────────────
    let monitor = TensionMonitor::new(&config).context("invalid engine configuration")?;

    info!(
        decay_rate = config.decay.decay_rate,
        capacity = config.decay.buffer_capacity,
        symbols = ?config.symbols,
        "Tension replay starting"
    );

    // ── 3. Replay frames ─────────────────────────────────────────────────
    let frames = match std::env::args().nth(1) {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open frame file {path}"))?;
            replay(&monitor, file, config.tick_interval_ms).await?
        }
        None => replay(&monitor, tokio::io::stdin(), config.tick_interval_ms).await?,
    };

    info!(frames, "Replay finished");
    Ok(())
}

/// Apply every parseable frame from `input`, printing a snapshot after each.
async fn replay<R>(monitor: &TensionMonitor, input: R, tick_interval_ms: u64) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut stdout = tokio::io::stdout();
    let mut applied = 0u64;
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await.context("failed to read frame")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let frame: TickFrame = match serde_json::from_str(&line) {
            Ok(f) => f,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed frame");
                continue;
            }
        };

        monitor.tick(&frame);
        applied += 1;

        let mut out = serde_json::to_vec(&monitor.build_snapshot())
            .context("failed to serialise snapshot")?;
        out.push(b'\n');
        stdout.write_all(&out).await.context("failed to write snapshot")?;

        if tick_interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(tick_interval_ms)).await;
        }
    }

    stdout.flush().await.context("failed to flush stdout")?;
    Ok(applied)
}
