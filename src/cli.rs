use crate::{rpc::DEFAULT_HOST, Client, Request};
use clap::Parser;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Call a JSON-RPC method over HTTP and print the result.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "RPC_HOST", default_value = DEFAULT_HOST)]
    pub host: Url,

    #[arg(short, long, env = "RPC_USER")]
    pub user: Option<String>,

    #[arg(short, long, env = "RPC_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub id: i64,

    /// Protocol version tag, e.g. "2.0". Omitted from the request when unset.
    #[arg(long)]
    pub jsonrpc: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    pub method: String,

    /// Positional parameters. Each is read as JSON, or as a plain string if
    /// it does not parse.
    #[arg(allow_hyphen_values = true)]
    pub params: Vec<String>,
}

impl Cli {
    pub fn client(&self) -> Result<Client, reqwest::Error> {
        let mut client = Client::new(self.host.clone());

        if let Some(secs) = self.timeout {
            let http = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()?;
            client = client.with_http_client(http);
        }

        if let Some(user) = &self.user {
            client = client.with_credentials(user, self.pass.clone().unwrap_or_default());
        }

        Ok(client)
    }

    pub fn request(&self) -> Request {
        let request = Request::new(&self.method, self.params(), self.id);
        match &self.jsonrpc {
            Some(version) => request.with_version(version),
            None => request,
        }
    }

    pub fn params(&self) -> Value {
        Value::Array(self.params.iter().map(|raw| parse_param(raw)).collect())
    }
}

fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
