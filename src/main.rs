use acs_tract_extractor::cli::{run, Cli};
use acs_tract_extractor::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
