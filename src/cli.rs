use clap::Parser;
use std::num::NonZeroU64;

use crate::options::{DEFAULT_ITERATIONS, DEFAULT_MAX_DEPTH, Options};

#[derive(Parser, Debug)]
#[command(name = "rezip")]
#[command(version)]
#[command(about = "Lossless in-place ZIP recompressor", long_about = None)]
#[command(after_help = "Examples:\n  \
  rezip app.apk book.epub        recompress both files in place\n  \
  rezip -f -o small.zip big.zip  only strip metadata, write to small.zip\n  \
  rezip -i 50 -d 1 docs.jar      more zopfli iterations, no nested archives")]
pub struct Cli {
    /// ZIP files to recompress
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Write the result here instead of replacing the input (single input only)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<String>,

    /// Fast mode: relocate entries without recompressing them
    #[arg(short = 'f', long = "fast")]
    pub fast: bool,

    /// Maximum nesting depth of archives inside archives
    #[arg(
        short = 'd',
        long = "max-depth",
        value_name = "N",
        default_value_t = DEFAULT_MAX_DEPTH
    )]
    pub max_depth: u32,

    /// Zopfli iterations per deflate stream
    #[arg(
        short = 'i',
        long = "iterations",
        value_name = "N",
        default_value_t = DEFAULT_ITERATIONS
    )]
    pub iterations: NonZeroU64,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Verbose output
    #[arg(short = 'v')]
    pub verbose: bool,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options::default()
            .with_fast(self.fast)
            .with_max_depth(self.max_depth)
            .with_iterations(self.iterations)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Log level implied by the verbosity flags.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.is_very_quiet() {
            log::LevelFilter::Error
        } else if self.is_quiet() {
            log::LevelFilter::Warn
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["rezip", "a.zip"]);
        assert_eq!(cli.files, vec!["a.zip"]);
        assert_eq!(cli.options(), Options::default());
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "rezip", "-f", "-d", "2", "-i", "40", "-qq", "-o", "out.zip", "in.zip",
        ]);
        let options = cli.options();
        assert!(options.fast);
        assert_eq!(options.max_depth, 2);
        assert_eq!(options.iterations.get(), 40);
        assert_eq!(cli.output.as_deref(), Some("out.zip"));
        assert_eq!(cli.log_level(), log::LevelFilter::Error);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(Cli::try_parse_from(["rezip", "-i", "0", "in.zip"]).is_err());
        assert!(Cli::try_parse_from(["rezip"]).is_err());
    }
}
