mod ideation_cmd;

use clap::Parser;
use ideation_cmd::IdeationCli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the API key may come from the real environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = ideation_engine::VERSION, "ideation starting");

    IdeationCli::parse().run().await
}
