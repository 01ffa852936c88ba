//! Request dispatch: the gate sequence every request walks through.
//!
//! authenticate → match route → access guard → extract params → build
//! invocation → execute (bounded) → normalize. Each gate has exactly one
//! failure exit; nothing is retried. The dispatcher holds no mutable state,
//! so one instance serves every request concurrently.

pub mod access_guard;
pub mod normalize;
pub mod params;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Method, Uri};
use serde_json::json;
use tracing::Instrument;

use crate::auth::Credentials;
use crate::config::{GatewayConfig, NodeConfig};
use crate::error::GatewayError;
use crate::node::{CommandExecutor, ProcessExecutor};
use crate::registry::{CommandRegistry, HttpMethod, RouteSpec, TimeoutClass};

pub use access_guard::{AccessDenied, AccessGuard};

/// Built-in liveness route, answered without touching the node.
pub const PING_PATH: &str = "/ping.json";

/// Per-class execution time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub default: Duration,
    pub slow: Duration,
}

impl Timeouts {
    pub fn from_config(node: &NodeConfig) -> Self {
        Self {
            default: node.default_timeout(),
            slow: node.slow_timeout(),
        }
    }

    pub fn for_class(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Default => self.default,
            TimeoutClass::Slow => self.slow,
        }
    }
}

/// Immutable request pipeline shared by all connections.
///
/// There is no queueing or admission control: N concurrent requests start N
/// concurrent node processes.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    credentials: Credentials,
    guard: AccessGuard,
    executor: Arc<dyn CommandExecutor>,
    timeouts: Timeouts,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        credentials: Credentials,
        guard: AccessGuard,
        executor: Arc<dyn CommandExecutor>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            registry,
            credentials,
            guard,
            executor,
            timeouts,
        }
    }

    /// Wire up the production pipeline: built-in routes, credentials from
    /// the environment, and the process executor.
    pub fn from_config(config: &GatewayConfig) -> crate::Result<Self> {
        config.validate()?;
        let registry = CommandRegistry::builtin()?;
        let credentials = Credentials::resolve(&config.auth)?;
        tracing::info!(
            routes = registry.len(),
            cli = %config.node.cli_command,
            "dispatcher ready"
        );
        Ok(Self::new(
            Arc::new(registry),
            credentials,
            AccessGuard::new(&config.access),
            Arc::new(ProcessExecutor::new(&config.node)),
            Timeouts::from_config(&config.node),
        ))
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run one request to completion, returning the JSON body on success.
    pub async fn dispatch(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> crate::Result<Vec<u8>> {
        self.credentials.verify(headers).inspect_err(|_| {
            tracing::debug!(method = %method, path = %uri.path(), "authentication failed");
        })?;

        let path = uri.path();
        if *method == Method::GET && path == PING_PATH {
            return Ok(json!({ "status": "pong" }).to_string().into_bytes());
        }

        let not_found = || GatewayError::RouteNotFound {
            method: method.to_string(),
            path: path.to_string(),
        };
        let http_method = HttpMethod::from_http(method).ok_or_else(not_found)?;
        let matched = self
            .registry
            .resolve(http_method, path)
            .ok_or_else(not_found)?;
        let route = matched.route;

        let span = tracing::info_span!("route", method = %route.method, path = %route.path);
        self.run(route, &matched.captures, uri.query())
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        route: &RouteSpec,
        captures: &[(&'static str, &str)],
        query: Option<&str>,
    ) -> crate::Result<Vec<u8>> {
        self.guard.check(route).map_err(|denied| {
            tracing::info!(verb = route.verb, reason = %denied, "route refused by access guard");
            GatewayError::AccessDenied(denied.to_string())
        })?;

        let args = params::extract_args(route, captures, query).inspect_err(|e| {
            tracing::debug!(error = %e, "request rejected during validation");
        })?;
        let invocation = params::build_invocation(route, args);
        let timeout = self.timeouts.for_class(route.timeout);

        let result = self.executor.execute(&invocation, timeout).await?;
        normalize::normalize(route, result).inspect_err(|e| {
            tracing::warn!(verb = route.verb, kind = e.kind(), "node command failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessConfig;
    use crate::node::stub::{StubExecutor, StubReply};
    use axum::http::{header, HeaderValue};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn timeouts() -> Timeouts {
        Timeouts {
            default: Duration::from_secs(5),
            slow: Duration::from_secs(300),
        }
    }

    fn dispatcher(stub: Arc<StubExecutor>, guard: AccessGuard) -> Dispatcher {
        Dispatcher::new(
            Arc::new(CommandRegistry::builtin().unwrap()),
            Credentials::new("rpc", "hunter2"),
            guard,
            stub,
            timeouts(),
        )
    }

    fn authed() -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", STANDARD.encode("rpc:hunter2"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    async fn get(d: &Dispatcher, uri: &str) -> crate::Result<Vec<u8>> {
        d.dispatch(&Method::GET, &uri.parse().unwrap(), &authed()).await
    }

    #[tokio::test]
    async fn test_ping_skips_node() {
        let stub = Arc::new(StubExecutor::new());
        let d = dispatcher(stub.clone(), AccessGuard::permissive());
        assert_eq!(get(&d, "/ping.json").await.unwrap(), br#"{"status":"pong"}"#);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ping_requires_auth() {
        let stub = Arc::new(StubExecutor::new());
        let d = dispatcher(stub, AccessGuard::permissive());
        let result = d
            .dispatch(&Method::GET, &"/ping.json".parse().unwrap(), &HeaderMap::new())
            .await;
        assert!(matches!(result, Err(GatewayError::Authentication)));
    }

    #[tokio::test]
    async fn test_unsupported_method_is_not_found() {
        let stub = Arc::new(StubExecutor::new());
        let d = dispatcher(stub.clone(), AccessGuard::permissive());
        let result = d
            .dispatch(
                &Method::DELETE,
                &"/get_block_count.json".parse().unwrap(),
                &authed(),
            )
            .await;
        assert!(matches!(result, Err(GatewayError::RouteNotFound { .. })));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_access_guard_blocks_before_execution() {
        let stub = Arc::new(StubExecutor::new());
        let guard = AccessGuard::new(&AccessConfig {
            deny: vec!["getpeerinfo".to_string()],
            ..AccessConfig::default()
        });
        let d = dispatcher(stub.clone(), guard);
        let result = get(&d, "/get_peer_info.json").await;
        assert!(matches!(result, Err(GatewayError::AccessDenied(_))));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_route_gets_slow_timeout() {
        let stub = Arc::new(StubExecutor::new().reply("gettxoutsetinfo", StubReply::ok("{}")));
        let d = dispatcher(stub.clone(), AccessGuard::permissive());
        get(&d, "/get_tx_out_set_info.json").await.unwrap();
        get(&d, "/get_mem_pool_info.json").await.unwrap();
        assert_eq!(
            stub.timeouts(),
            vec![Duration::from_secs(300), Duration::from_secs(5)]
        );
    }

    #[tokio::test]
    async fn test_fixed_argument_forwarded() {
        let stub = Arc::new(StubExecutor::new().reply("getrawtransaction", StubReply::ok("{}")));
        let d = dispatcher(stub.clone(), AccessGuard::permissive());
        get(&d, "/get_raw_transaction.json/abcd").await.unwrap();
        assert_eq!(stub.calls()[0].argv(), vec!["getrawtransaction", "abcd", "1"]);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_error() {
        let stub = Arc::new(StubExecutor::new().reply("verifychain", StubReply::Timeout));
        let d = dispatcher(stub, AccessGuard::permissive());
        let err = get(&d, "/verify_chain.json").await.unwrap_err();
        assert_eq!(err.kind(), "ExecutionTimeoutError");
    }

    #[test]
    fn test_timeouts_from_config() {
        let node = NodeConfig {
            default_timeout_secs: 7,
            slow_timeout_secs: 70,
            ..NodeConfig::default()
        };
        let t = Timeouts::from_config(&node);
        assert_eq!(t.for_class(TimeoutClass::Default), Duration::from_secs(7));
        assert_eq!(t.for_class(TimeoutClass::Slow), Duration::from_secs(70));
    }
}
