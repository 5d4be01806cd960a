pub mod cli;
pub mod error;
pub mod rpc;
pub mod types;

pub use cli::Cli;
pub use error::{DecodeError, Error};
pub use rpc::{call, default_client, execute, Client, DEFAULT_HOST};
pub use types::{Request, Response, RpcError, JSONRPC_VERSION};
