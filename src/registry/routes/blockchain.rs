//! Blockchain query routes.
//!
//! All read-only. `getblock` and `getblockheader` default to their verbose
//! JSON form; the `*_raw_*` variants pin the hex form with a fixed argument so
//! that one route always has one output shape.

use super::RouteGroup;
use crate::registry::{ParamSpec, ParamType, RouteSpec};

/// Built-in route group for blockchain queries.
pub struct BlockchainRoutes;

impl RouteGroup for BlockchainRoutes {
    fn name(&self) -> &'static str {
        "blockchain"
    }

    fn routes(&self) -> Vec<RouteSpec> {
        vec![
            RouteSpec::get("/get_best_block_hash.json", "getbestblockhash")
                .text("best_block_hash"),
            RouteSpec::get("/get_block.json/:hash", "getblock")
                .params(vec![ParamSpec::path("hash", ParamType::String)]),
            RouteSpec::get("/get_raw_block.json/:hash", "getblock")
                .params(vec![
                    ParamSpec::path("hash", ParamType::String),
                    ParamSpec::fixed("verbose", "false"),
                ])
                .text("block"),
            RouteSpec::get("/get_block_chain_info.json", "getblockchaininfo"),
            RouteSpec::get("/get_block_count.json", "getblockcount").number("block_count"),
            RouteSpec::get("/get_block_hash.json/:index", "getblockhash")
                .params(vec![ParamSpec::path("index", ParamType::Integer)])
                .text("block_hash"),
            RouteSpec::get("/get_block_header.json/:hash", "getblockheader")
                .params(vec![ParamSpec::path("hash", ParamType::String)]),
            RouteSpec::get("/get_raw_block_header.json/:hash", "getblockheader")
                .params(vec![
                    ParamSpec::path("hash", ParamType::String),
                    ParamSpec::fixed("verbose", "false"),
                ])
                .text("block_header"),
            RouteSpec::get("/get_chain_tips.json", "getchaintips"),
            RouteSpec::get("/get_difficulty.json", "getdifficulty").number("difficulty"),
            RouteSpec::get("/get_mem_pool_info.json", "getmempoolinfo"),
            RouteSpec::get("/get_raw_mem_pool.json", "getrawmempool").params(vec![
                ParamSpec::optional("verbose", ParamType::Boolean).or("true"),
            ]),
            RouteSpec::get("/get_tx_out.json/:txid/:n", "gettxout").params(vec![
                ParamSpec::path("txid", ParamType::String),
                ParamSpec::path("n", ParamType::Integer),
                ParamSpec::optional("include_mempool", ParamType::Boolean),
            ]),
            RouteSpec::get("/get_tx_out_proof.json", "gettxoutproof")
                .params(vec![
                    ParamSpec::query("txids", ParamType::Json),
                    ParamSpec::optional("block_hash", ParamType::String),
                ])
                .text("proof"),
            RouteSpec::get("/get_tx_out_set_info.json", "gettxoutsetinfo").slow(),
            RouteSpec::get("/verify_chain.json", "verifychain")
                .params(vec![
                    ParamSpec::optional("check_level", ParamType::Integer),
                    ParamSpec::optional("num_blocks", ParamType::Integer),
                ])
                .boolean("verified")
                .slow(),
            RouteSpec::get("/verify_tx_out_proof.json/:proof", "verifytxoutproof")
                .params(vec![ParamSpec::path("proof", ParamType::String)]),
        ]
    }
}
