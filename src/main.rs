use clap::Parser;
use eyre::Result;
use rpc_basic::{Cli, Response};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = cli.client()?;
    let request = cli.request();

    info!("Calling {} on {}", request.method, client.url());
    let response: Response = client.call(&request)?;

    match response.into_result()? {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        None => println!("null"),
    }

    Ok(())
}
