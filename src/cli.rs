use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "duplexpdf")]
#[command(about = "Split PDFs into odd and even page documents for manual duplex printing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split every PDF in a directory into an odd-page and an even-page document
    Run {
        /// Directory containing the source PDFs
        input_dir: PathBuf,

        /// Directory the two output documents are written to
        #[arg(short, long)]
        output_dir: PathBuf,

        /// File name of the document collecting odd-index pages (2nd, 4th, ...)
        #[arg(long, default_value = crate::config::DEFAULT_ODD_NAME)]
        odd_name: String,

        /// File name of the document collecting even-index pages (1st, 3rd, ...)
        #[arg(long, default_value = crate::config::DEFAULT_EVEN_NAME)]
        even_name: String,

        /// Only load input files whose name matches this regular expression
        #[arg(short, long)]
        include: Option<String>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how each PDF in a directory would be split, without writing anything
    #[command(alias = "dry-run")]
    Plan {
        /// Directory containing the source PDFs
        input_dir: PathBuf,

        /// Only load input files whose name matches this regular expression
        #[arg(short, long)]
        include: Option<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}
