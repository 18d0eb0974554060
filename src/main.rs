use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    grok_cli::cli::run().await
}
