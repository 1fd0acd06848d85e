use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "antiope", version, about = "Newsgroup lister for NNTP over websockets")]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, value_name = "URL", help = "Override ServerUrl")]
    pub url: Option<String>,

    #[arg(
        short,
        long,
        help = "Log level (trace, debug, info, warn, error); overrides LogLevel"
    )]
    pub log_level: Option<String>,

    #[arg(
        short = 'o',
        long = "option",
        value_name = "KEY=VALUE",
        help = "Override a configuration option"
    )]
    pub options: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// List newsgroups with descriptions and article watermarks
    Groups {
        #[arg(long)]
        json: bool,
    },
    /// Send one raw command and print the response lines
    Send {
        name: String,
        args: Vec<String>,
        #[arg(long, help = "Print body lines only")]
        strip: bool,
    },
}
