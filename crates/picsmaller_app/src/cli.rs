use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "picsmaller", version, about = "Compress a batch of images and bundle the results")]
pub struct Cli {
    /// Image files to compress.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory that receives the archive and single files.
    #[arg(short, long, default_value = "output")]
    pub out: PathBuf,

    /// Encoder quality, 1-100.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    #[arg(long)]
    pub max_width: Option<u32>,

    #[arg(long)]
    pub max_height: Option<u32>,

    /// File name of the bundled archive.
    #[arg(long)]
    pub archive_name: Option<String>,

    /// DEFLATE level for the archive, 0-9.
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=9))]
    pub level: Option<i64>,

    /// Also save every compressed image as its own file.
    #[arg(long)]
    pub each: bool,

    /// Skip the archive.
    #[arg(long)]
    pub no_archive: bool,

    /// RON settings file; flags take precedence over its values.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

impl Cli {
    pub fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "picsmaller",
            "a.png",
            "b.jpg",
            "--quality",
            "40",
            "--each",
            "--log",
            "both",
        ])
        .unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.quality, Some(40));
        assert!(cli.each);
        assert_eq!(cli.log, LogTarget::Both);
        assert_eq!(cli.out, PathBuf::from("output"));
    }

    #[test]
    fn rejects_out_of_range_quality() {
        assert!(Cli::try_parse_from(["picsmaller", "a.png", "--quality", "0"]).is_err());
        assert!(Cli::try_parse_from(["picsmaller", "a.png", "--level", "12"]).is_err());
    }
}
