//! `edgeurl batch [path]` – one edge URL per JSON Lines request.

use anyhow::{bail, Context, Result};
use edgeurl_core::config::EdgeConfig;
use edgeurl_core::edge_url::EdgeUrlBuilder;
use edgeurl_core::request::{self, apply_default_media_type};
use edgeurl_core::MediaType;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Counts of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub built: usize,
    pub failed: usize,
}

pub fn run_batch_from_path(cfg: &EdgeConfig, path: Option<&Path>) -> Result<()> {
    cfg.validate()?;
    let builder = EdgeUrlBuilder::from_config(cfg);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = match path.filter(|p| *p != Path::new("-")) {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            run_batch(&builder, cfg.default_media_type, BufReader::new(file), &mut out)?
        }
        None => run_batch(&builder, cfg.default_media_type, io::stdin().lock(), &mut out)?,
    };
    out.flush()?;

    tracing::info!(built = summary.built, failed = summary.failed, "batch finished");
    if summary.failed > 0 {
        bail!(
            "{} of {} request(s) failed",
            summary.failed,
            summary.built + summary.failed
        );
    }
    Ok(())
}

/// Writes one URL per valid request to `out`; invalid lines go to stderr and
/// are counted but do not stop the batch.
pub fn run_batch<R: BufRead, W: Write>(
    builder: &EdgeUrlBuilder,
    default_media_type: Option<MediaType>,
    input: R,
    out: &mut W,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    for parsed in request::parse_requests(input) {
        match parsed {
            Ok(mut req) => {
                apply_default_media_type(&mut req, default_media_type);
                writeln!(out, "{}", builder.build_request(&req))?;
                summary.built += 1;
            }
            Err(err) => {
                tracing::warn!(line = err.line(), "skipping request: {}", err);
                eprintln!("edgeurl: {err}");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
