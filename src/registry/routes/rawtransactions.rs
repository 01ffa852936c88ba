//! Raw transaction routes.
//!
//! `signrawtransaction` takes private keys as an argument and is flagged
//! sensitive: its arguments are never logged and its stderr never echoed.

use super::RouteGroup;
use crate::registry::{ParamSpec, ParamType, RouteSpec};

// The ANYONECANPAY combinations contain `|` and cannot pass input validation.
const SIGHASH_TYPES: &[&str] = &["ALL", "NONE", "SINGLE"];

/// Built-in route group for raw transaction commands.
pub struct RawTransactionRoutes;

impl RouteGroup for RawTransactionRoutes {
    fn name(&self) -> &'static str {
        "rawtransactions"
    }

    fn routes(&self) -> Vec<RouteSpec> {
        vec![
            RouteSpec::get("/create_raw_transaction.json", "createrawtransaction")
                .params(vec![
                    ParamSpec::query("inputs", ParamType::Json),
                    ParamSpec::query("outputs", ParamType::Json),
                    ParamSpec::optional("locktime", ParamType::Integer),
                ])
                .text("hex"),
            RouteSpec::get("/decode_raw_transaction.json/:hex_string", "decoderawtransaction")
                .params(vec![ParamSpec::path("hex_string", ParamType::String)]),
            RouteSpec::get("/decode_script.json/:hex", "decodescript")
                .params(vec![ParamSpec::path("hex", ParamType::String)]),
            RouteSpec::get("/get_raw_transaction.json/:txid", "getrawtransaction").params(vec![
                ParamSpec::path("txid", ParamType::String),
                ParamSpec::fixed("verbose", "1"),
            ]),
            RouteSpec::get("/get_raw_transaction_hex.json/:txid", "getrawtransaction")
                .params(vec![
                    ParamSpec::path("txid", ParamType::String),
                    ParamSpec::fixed("verbose", "0"),
                ])
                .text("hex"),
            RouteSpec::post("/send_raw_transaction.json/:hex_string", "sendrawtransaction")
                .params(vec![
                    ParamSpec::path("hex_string", ParamType::String),
                    ParamSpec::optional("allow_high_fees", ParamType::Boolean),
                ])
                .text("txid"),
            RouteSpec::post("/sign_raw_transaction.json/:hex_string", "signrawtransaction")
                .params(vec![
                    ParamSpec::path("hex_string", ParamType::String),
                    ParamSpec::optional("prev_txs", ParamType::Json),
                    ParamSpec::optional("private_keys", ParamType::Json),
                    ParamSpec::optional("sighash_type", ParamType::Choice(SIGHASH_TYPES)),
                ])
                .sensitive(),
        ]
    }
}
