//! Node control routes: status, help, start and stop.
//!
//! Starting the node is the one route that runs the daemon binary instead of
//! the CLI front-end; it only launches the daemon and does not supervise it.

use super::RouteGroup;
use crate::registry::{ParamSpec, ParamType, RouteSpec};

/// Built-in route group for node control commands.
pub struct ControlRoutes;

impl RouteGroup for ControlRoutes {
    fn name(&self) -> &'static str {
        "control"
    }

    fn routes(&self) -> Vec<RouteSpec> {
        vec![
            RouteSpec::get("/get_info.json", "getinfo"),
            RouteSpec::get("/help.json", "help")
                .params(vec![ParamSpec::optional("command", ParamType::String)])
                .text("help"),
            RouteSpec::post("/start.json", "-daemon").daemon().text("status"),
            RouteSpec::post("/stop.json", "stop").text("status"),
        ]
    }
}
