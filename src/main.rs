//! Main entry point for the rezip CLI application.
//!
//! Every file named on the command line is loaded, recompressed in memory and
//! written back when the result is smaller.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;

use rezip::{Cli, Options, shrink_zip};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and processes each file in
/// turn. A file that is not a usable ZIP is reported and skipped.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    if cli.output.is_some() && cli.files.len() > 1 {
        bail!("-o can only be used with a single input file");
    }

    let options = cli.options();
    let mut total_before = 0u64;
    let mut total_after = 0u64;

    for file in &cli.files {
        let output = cli.output.as_deref().unwrap_or(file);
        match process_file(Path::new(file), Path::new(output), options).await {
            Ok((before, after)) => {
                total_before += before;
                total_after += after;
                if !cli.is_quiet() {
                    println!(
                        "{}: {} -> {} ({})",
                        file,
                        format_size(before),
                        format_size(after),
                        saved(before, after)
                    );
                }
            }
            Err(e) if is_fallback(&e) => log::warn!("{}: {}, skipped", file, e),
            Err(e) => return Err(e),
        }
    }

    if cli.files.len() > 1 && !cli.is_quiet() {
        println!(
            "Total: {} -> {} ({})",
            format_size(total_before),
            format_size(total_after),
            saved(total_before, total_after)
        );
    }

    Ok(())
}

/// Recompress one file.
///
/// The result is written to `output` only when it is smaller, or when
/// `output` differs from `input` (so the output file always exists).
///
/// # Returns
///
/// The sizes before and after recompression.
async fn process_file(input: &Path, output: &Path, options: Options) -> Result<(u64, u64)> {
    let mut data = tokio::fs::read(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let before = data.len() as u64;

    let report = shrink_zip(&mut data, options)?;
    log::debug!("{}: {:?}", input.display(), report);
    if report.dropped > 0 || report.truncated {
        log::warn!(
            "{}: {} entries dropped{}",
            input.display(),
            report.dropped,
            if report.truncated {
                ", archive truncated"
            } else {
                ""
            }
        );
    }

    let after = data.len() as u64;
    if after < before || input != output {
        tokio::fs::write(output, &data)
            .await
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    Ok((before, after))
}

/// Whether the error only means the file is not something we can rewrite.
fn is_fallback(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<rezip::Error>()
        .is_some_and(rezip::Error::is_fallback)
}

/// Percentage saved, for the summary lines.
fn saved(before: u64, after: u64) -> String {
    if before == 0 {
        return "0.00%".to_string();
    }
    let ratio = before.saturating_sub(after) as f64 * 100.0 / before as f64;
    format!("-{:.2}%", ratio)
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
