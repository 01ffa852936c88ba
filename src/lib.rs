//! blockchain-gateway: authenticated HTTP front for a blockchain node's
//! command-line interface.
//! Each route maps onto exactly one `bitcoin-cli <verb> <args...>` invocation:
//! parameters are validated against the route's declaration, the command runs
//! as a structured-argument subprocess with a bounded timeout, and its output
//! is normalized into a JSON body.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod registry;
pub mod server;

pub use auth::Credentials;
pub use config::{
    parse_env_ref, resolve_env_vars, AccessConfig, AuthConfig, GatewayConfig, NodeConfig,
    ServerConfig,
};
pub use dispatch::{AccessDenied, AccessGuard, Dispatcher, Timeouts};
pub use error::{GatewayError, Result};
pub use node::{CommandExecutor, CommandInvocation, CommandResult, ProcessExecutor};
pub use registry::{CommandRegistry, RouteSpec};
pub use server::{router, serve};
