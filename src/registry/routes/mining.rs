use super::RouteGroup;
use crate::registry::{ParamSpec, ParamType, RouteSpec};

/// Built-in route group for mining commands.
pub struct MiningRoutes;

impl RouteGroup for MiningRoutes {
    fn name(&self) -> &'static str {
        "mining"
    }

    fn routes(&self) -> Vec<RouteSpec> {
        vec![
            RouteSpec::get("/get_block_template.json", "getblocktemplate")
                .params(vec![ParamSpec::optional("template_request", ParamType::Json)]),
            RouteSpec::get("/get_mining_info.json", "getmininginfo"),
            RouteSpec::get("/get_network_hash_ps.json", "getnetworkhashps")
                .params(vec![
                    ParamSpec::optional("blocks", ParamType::Integer),
                    ParamSpec::optional("height", ParamType::Integer),
                ])
                .number("network_hash_ps"),
            RouteSpec::post(
                "/prioritise_transaction.json/:txid/:priority_delta/:fee_delta",
                "prioritisetransaction",
            )
            .params(vec![
                ParamSpec::path("txid", ParamType::String),
                ParamSpec::path("priority_delta", ParamType::Number),
                ParamSpec::path("fee_delta", ParamType::Integer),
            ])
            .boolean("prioritised"),
            // Empty output means the block was accepted; otherwise a rejection reason.
            RouteSpec::post("/submit_block.json/:hex_data", "submitblock")
                .params(vec![
                    ParamSpec::path("hex_data", ParamType::String),
                    ParamSpec::optional("parameters", ParamType::Json),
                ])
                .text("rejection"),
        ]
    }
}
