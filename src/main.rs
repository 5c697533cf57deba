//! Diffbot CLI - extract the main article from a web page
//!
//! Fetches the page through the Diffbot article API, optionally caching the
//! response, and prints the result to stdout.

use clap::Parser;

use diffbot::cli::{render_article, Cli, OutputFormat, StartupConfig};
use diffbot::logging::init_tracing;
use diffbot::{ArticleOptions, DiffbotClient};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let startup = StartupConfig::from_cli(cli)?;

    init_tracing(startup.log_level);

    let client = DiffbotClient::new(startup.client)?;
    let options = ArticleOptions {
        keep_raw_response: startup.output == OutputFormat::Raw,
        ..Default::default()
    };

    let article = client.article(&startup.url, &options).await?;
    println!("{}", render_article(&article, startup.output)?);

    tracing::info!("done");
    Ok(())
}
