use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    scout::cli::run().await
}
