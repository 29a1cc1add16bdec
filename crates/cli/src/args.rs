use std::path::PathBuf;

use clap::{ArgAction, Parser};
use flac2mp3_core::QualityFlags;

/// Convert FLAC files to MP3 in parallel, keeping tags and folder layout.
#[derive(Debug, Parser)]
#[command(name = "flac2mp3", version, disable_version_flag = true)]
pub struct Cli {
    /// FLAC files and directories to convert (directories are searched recursively)
    #[arg(value_name = "FILES", required_unless_present = "file")]
    pub files: Vec<PathBuf>,

    /// Write MP3s below this directory, mirroring the input tree
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Root of the mirrored tree (default: deepest common input directory)
    #[arg(short = 'd', long, value_name = "DIR", requires = "output_dir")]
    pub root_dir: Option<PathBuf>,

    /// Read input paths from a file, one per line ("-" for stdin)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Number of parallel conversions (default: number of cores)
    #[arg(short = 'n', long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Append log output to this file
    #[arg(short = 'l', long = "log", value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Do not log to the console
    #[arg(short, long)]
    pub quiet: bool,

    /// Use the default encoder quality (-V2)
    #[arg(long)]
    pub default_quality: bool,

    /// Variable bit rate level, 0 (best) to 9
    #[arg(short = 'V', value_name = "N")]
    pub vbr: Option<u8>,

    /// Named lame preset, passed through verbatim
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Copy non-FLAC files matching this regex into the output directory
    #[arg(short = 'c', long, value_name = "REGEX")]
    pub copy_pattern: Option<String>,

    /// Characters to remove from output file and directory names
    #[arg(long, value_name = "CHARS")]
    pub strip_chars: Option<String>,

    /// Configuration file
    #[arg(long, value_name = "FILE", env = "FLAC2MP3_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

impl Cli {
    pub fn quality_flags(&self) -> QualityFlags {
        QualityFlags {
            default_quality: self.default_quality,
            vbr: self.vbr,
            preset: self.preset.clone(),
        }
    }
}
