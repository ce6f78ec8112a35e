use std::sync::Arc;

use clap::Parser;

use forage::api;
use forage::config::Config;
use forage::fetcher::PageFetcher;
use forage::pipeline::Pipeline;
use forage::providers;

#[derive(Parser, Debug)]
#[command(about = "Web search-and-scrape service")]
struct Args {
    /// Address to serve the API on
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Run one search-and-scrape, print the JSON result, and exit
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let provider = providers::from_config(&config)?;
    let fetcher = PageFetcher::new(&config.http);
    let pipeline = Arc::new(Pipeline::new(provider, fetcher));

    if let Some(query) = args.query {
        let response = pipeline.run(&query).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let router = api::create_router(pipeline);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!("listening on {}", args.bind);
    axum::serve(listener, router).await?;
    Ok(())
}
