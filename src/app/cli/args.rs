//! Command line arguments

use crate::core::logging::{LOG_FORMATS, LOG_LEVELS};
use crate::core::version::long_version;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "pickman")]
#[command(about = "Run a configured data collector")]
#[command(version, long_version = long_version())]
pub struct Args {
    /// Configuration file (JSON, or TOML with a .toml extension)
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Name of the collector instance to run
    #[arg(
        short = 'n',
        long = "name",
        value_name = "COLLECTOR",
        required_unless_present = "list_plugins"
    )]
    pub name: Option<String>,

    /// List registered plugins for each capability and exit
    #[arg(long = "list-plugins")]
    pub list_plugins: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = LOG_FORMATS)]
    pub log_format: Option<String>,

    /// Also write log output to this file
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// More output (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Args {
    /// Net verbosity: positive for `-v`, negative for `-q`
    pub fn verbosity(&self) -> i8 {
        let verbose = self.verbose.min(i8::MAX as u8) as i8;
        let quiet = self.quiet.min(i8::MAX as u8) as i8;
        verbose - quiet
    }

    /// Colour unless disabled; auto-detects a terminal when not forced
    pub fn use_color(&self) -> bool {
        use std::io::IsTerminal;
        !self.no_color && (self.color || std::io::stderr().is_terminal())
    }
}
