//! Built-in route groups.
//!
//! Each group covers one category of the node's command vocabulary and
//! contributes its routes to the registry in declaration order. Adding an
//! operation means adding one `RouteSpec` to the matching group.

mod blockchain;
mod control;
mod generating;
mod mining;
mod network;
mod rawtransactions;
mod util;

pub use blockchain::BlockchainRoutes;
pub use control::ControlRoutes;
pub use generating::GeneratingRoutes;
pub use mining::MiningRoutes;
pub use network::NetworkRoutes;
pub use rawtransactions::RawTransactionRoutes;
pub use util::UtilRoutes;

use super::RouteSpec;

/// A category of node commands exposed as HTTP routes.
pub trait RouteGroup: Send + Sync {
    /// Category name as the node's `help` output groups it (e.g., "blockchain").
    fn name(&self) -> &'static str;

    /// Routes in declaration order.
    fn routes(&self) -> Vec<RouteSpec>;
}

/// All built-in groups, in registry declaration order.
pub fn groups() -> Vec<Box<dyn RouteGroup>> {
    vec![
        Box::new(ControlRoutes),
        Box::new(BlockchainRoutes),
        Box::new(GeneratingRoutes),
        Box::new(MiningRoutes),
        Box::new(NetworkRoutes),
        Box::new(RawTransactionRoutes),
        Box::new(UtilRoutes),
    ]
}

/// Every built-in route, flattened across groups.
pub fn all() -> Vec<RouteSpec> {
    groups().iter().flat_map(|g| g.routes()).collect()
}
