//! Utility routes: fee estimation, address and message helpers.

use super::RouteGroup;
use crate::registry::{ParamSpec, ParamType, RouteSpec};

/// Built-in route group for utility commands.
pub struct UtilRoutes;

impl RouteGroup for UtilRoutes {
    fn name(&self) -> &'static str {
        "util"
    }

    fn routes(&self) -> Vec<RouteSpec> {
        vec![
            RouteSpec::get("/create_multisig.json/:n_required", "createmultisig").params(vec![
                ParamSpec::path("n_required", ParamType::Integer),
                ParamSpec::query("keys", ParamType::Json),
            ]),
            RouteSpec::get("/estimate_fee.json/:num_blocks", "estimatefee")
                .params(vec![ParamSpec::path("num_blocks", ParamType::Integer)])
                .number("fee_per_kb"),
            RouteSpec::get("/estimate_priority.json/:num_blocks", "estimatepriority")
                .params(vec![ParamSpec::path("num_blocks", ParamType::Integer)])
                .number("priority"),
            RouteSpec::get("/estimate_smart_fee.json/:num_blocks", "estimatesmartfee")
                .params(vec![ParamSpec::path("num_blocks", ParamType::Integer)]),
            RouteSpec::get("/estimate_smart_priority.json/:num_blocks", "estimatesmartpriority")
                .params(vec![ParamSpec::path("num_blocks", ParamType::Integer)]),
            RouteSpec::get("/validate_address.json/:address", "validateaddress")
                .params(vec![ParamSpec::path("address", ParamType::String)]),
            // Signatures are base64 and may contain `/`, so they travel in the query.
            RouteSpec::get("/verify_message.json/:address", "verifymessage")
                .params(vec![
                    ParamSpec::path("address", ParamType::String),
                    ParamSpec::query("signature", ParamType::String),
                    ParamSpec::query("message", ParamType::String),
                ])
                .boolean("verified"),
            RouteSpec::post("/sign_message_with_priv_key.json", "signmessagewithprivkey")
                .params(vec![
                    ParamSpec::query("private_key", ParamType::String),
                    ParamSpec::query("message", ParamType::String),
                ])
                .text("signature")
                .sensitive(),
        ]
    }
}
