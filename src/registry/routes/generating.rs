//! Block generation routes (regtest mining and the legacy generate switch).

use super::RouteGroup;
use crate::registry::{ParamSpec, ParamType, RouteSpec};

/// Built-in route group for block generation.
pub struct GeneratingRoutes;

impl RouteGroup for GeneratingRoutes {
    fn name(&self) -> &'static str {
        "generating"
    }

    fn routes(&self) -> Vec<RouteSpec> {
        vec![
            // Mines before returning; a large count takes a while.
            RouteSpec::post("/generate.json/:num_blocks", "generate")
                .params(vec![
                    ParamSpec::path("num_blocks", ParamType::Integer),
                    ParamSpec::optional("max_tries", ParamType::Integer),
                ])
                .slow(),
            RouteSpec::get("/get_generate.json", "getgenerate").boolean("generate"),
            RouteSpec::post("/set_generate.json/:generate", "setgenerate")
                .params(vec![
                    ParamSpec::path("generate", ParamType::Boolean),
                    ParamSpec::optional("gen_proc_limit", ParamType::Integer),
                ])
                .acknowledge(),
        ]
    }
}
