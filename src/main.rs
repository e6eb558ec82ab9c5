//! ref-footnotes CLI
//!
//! Post-processes Markdown converted from HTML: commas between adjacent
//! footnote markers, titles for bare-URL footnotes.

use anyhow::Result;
use clap::{Parser, Subcommand};

use ref_footnotes::logging::init_logging;
use ref_footnotes::pipeline::{run_process, ProcessArgs};
use ref_footnotes::title::{run_title, TitleArgs};

#[derive(Parser)]
#[command(name = "ref-footnotes")]
#[command(author = "RoyalBit Inc.")]
#[command(version)]
#[command(about = "Turn bare-URL footnotes into titled, dated links")]
#[command(long_about = "Fetches each footnote URL once and uses the page or PDF title.\n\nCommands:\n  process   Rewrite footnotes in a markdown file\n  title     Resolve URLs to titles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Separate adjacent footnote markers and resolve bare-URL footnotes
    Process(ProcessArgs),
    /// Resolve URLs to page or PDF titles
    Title(TitleArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => {
            init_logging(args.debug);
            run_process(args).await
        }
        Commands::Title(args) => {
            init_logging(false);
            run_title(args).await
        }
    }
}
