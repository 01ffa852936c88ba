//! Peer-to-peer network routes.
//!
//! Peer management (add, disconnect, ban, ping) mutates node state and is
//! exposed as POST. Subnets contain `/` and must be percent-encoded in the path.

use super::RouteGroup;
use crate::registry::{ParamSpec, ParamType, RouteSpec};

const ADDNODE_COMMANDS: &[&str] = &["add", "remove", "onetry"];
const SETBAN_COMMANDS: &[&str] = &["add", "remove"];

/// Built-in route group for network commands.
pub struct NetworkRoutes;

impl RouteGroup for NetworkRoutes {
    fn name(&self) -> &'static str {
        "network"
    }

    fn routes(&self) -> Vec<RouteSpec> {
        vec![
            RouteSpec::post("/add_node.json/:node/:command", "addnode")
                .params(vec![
                    ParamSpec::path("node", ParamType::String),
                    ParamSpec::path("command", ParamType::Choice(ADDNODE_COMMANDS)),
                ])
                .acknowledge(),
            RouteSpec::post("/clear_banned.json", "clearbanned").acknowledge(),
            RouteSpec::post("/disconnect_node.json/:node", "disconnectnode")
                .params(vec![ParamSpec::path("node", ParamType::String)])
                .acknowledge(),
            RouteSpec::get("/get_added_node_info.json", "getaddednodeinfo").params(vec![
                ParamSpec::optional("dns", ParamType::Boolean).or("true"),
                ParamSpec::optional("node", ParamType::String),
            ]),
            RouteSpec::get("/get_connection_count.json", "getconnectioncount")
                .number("connection_count"),
            RouteSpec::get("/get_net_totals.json", "getnettotals"),
            RouteSpec::get("/get_network_info.json", "getnetworkinfo"),
            RouteSpec::get("/get_peer_info.json", "getpeerinfo"),
            RouteSpec::get("/list_banned.json", "listbanned"),
            RouteSpec::post("/ping_peers.json", "ping").acknowledge(),
            RouteSpec::post("/set_ban.json/:subnet/:command", "setban")
                .params(vec![
                    ParamSpec::path("subnet", ParamType::String),
                    ParamSpec::path("command", ParamType::Choice(SETBAN_COMMANDS)),
                    ParamSpec::optional("ban_time", ParamType::Integer),
                    ParamSpec::optional("absolute", ParamType::Boolean),
                ])
                .acknowledge(),
        ]
    }
}
