//! Parameter extraction: turns path captures and the query string into the
//! positional argument list of a node command.
//!
//! Every value is decoded, screened for shell metacharacters, then parsed
//! against its declared type. Nothing here touches the node: a request that
//! fails validation never produces an invocation.

use std::collections::HashMap;

use crate::error::GatewayError;
use crate::node::CommandInvocation;
use crate::registry::{ParamSource, ParamSpec, ParamType, RouteSpec};

/// Characters that separate or substitute commands in a shell.
const FORBIDDEN_CHARS: &[char] = &[';', '|', '&', '`', '$', '<', '>', '\n', '\r', '\0'];

/// Build the validated positional arguments for `route`.
///
/// `captures` are the raw (still percent-encoded) path captures from the
/// route match; `query` is the raw query string, if any.
pub fn extract_args(
    route: &RouteSpec,
    captures: &[(&'static str, &str)],
    query: Option<&str>,
) -> crate::Result<Vec<String>> {
    let mut supplied: HashMap<&str, String> = HashMap::new();

    for &(name, raw) in captures {
        supplied.insert(name, decode_component(name, raw, false)?);
    }

    for (key, value) in parse_query(query.unwrap_or_default())? {
        let Some(param) = route
            .params
            .iter()
            .find(|p| p.name == key && p.source == ParamSource::Query)
        else {
            return Err(GatewayError::Validation(format!(
                "unknown query parameter '{}'",
                key
            )));
        };
        if supplied.insert(param.name, value).is_some() {
            return Err(GatewayError::Validation(format!(
                "query parameter '{}' given more than once",
                param.name
            )));
        }
    }

    let mut args = Vec::with_capacity(route.params.len());
    // First optional param the caller left out without a default; every
    // later positional must then be absent too.
    let mut gap: Option<&str> = None;

    for param in &route.params {
        if let ParamSource::Fixed(value) = param.source {
            args.push(value.to_string());
            continue;
        }

        match supplied.remove(param.name) {
            Some(value) => {
                if let Some(missing) = gap {
                    return Err(GatewayError::Validation(format!(
                        "parameter '{}' requires '{}' to be given first",
                        param.name, missing
                    )));
                }
                args.push(check_value(param, &value)?);
            }
            None if param.required => {
                return Err(GatewayError::Validation(format!(
                    "missing required parameter '{}'",
                    param.name
                )));
            }
            None => match (param.default, gap) {
                (Some(default), None) => args.push(default.to_string()),
                (None, None) => gap = Some(param.name),
                (_, Some(_)) => {}
            },
        }
    }

    Ok(args)
}

/// Assemble the invocation for a route from its validated arguments.
pub fn build_invocation(route: &RouteSpec, args: Vec<String>) -> CommandInvocation {
    CommandInvocation {
        program: route.program,
        verb: route.verb.to_string(),
        args,
        sensitive: route.sensitive,
    }
}

/// Validate one decoded value and return the form forwarded to the node.
fn check_value(param: &ParamSpec, value: &str) -> crate::Result<String> {
    if value.contains(FORBIDDEN_CHARS) {
        return Err(GatewayError::Validation(format!(
            "parameter '{}' contains a disallowed character",
            param.name
        )));
    }

    let invalid = || {
        GatewayError::Validation(format!(
            "invalid value for parameter '{}': expected {}",
            param.name, param.ty
        ))
    };

    match param.ty {
        ParamType::String => {
            if value.is_empty() {
                return Err(invalid());
            }
            if value.starts_with('-') {
                return Err(GatewayError::Validation(format!(
                    "parameter '{}' must not start with '-'",
                    param.name
                )));
            }
            Ok(value.to_string())
        }
        ParamType::Integer => value
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|_| invalid()),
        // JSON number grammar: no NaN, infinities, or leading '+'/'.'
        ParamType::Number => {
            if value.trim() == value && serde_json::from_str::<serde_json::Number>(value).is_ok() {
                Ok(value.to_string())
            } else {
                Err(invalid())
            }
        }
        ParamType::Boolean => match value {
            "true" | "false" => Ok(value.to_string()),
            _ => Err(invalid()),
        },
        ParamType::Json => serde_json::from_str::<serde_json::Value>(value)
            .map(|doc| doc.to_string())
            .map_err(|_| invalid()),
        ParamType::Choice(options) => {
            if options.contains(&value) {
                Ok(value.to_string())
            } else {
                Err(invalid())
            }
        }
    }
}

/// Split a raw query string into decoded `(key, value)` pairs.
fn parse_query(query: &str) -> crate::Result<Vec<(String, String)>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component("query key", key, true)?;
            let value = decode_component(&key, value, true)?;
            Ok((key, value))
        })
        .collect()
}

/// Percent-decode one component; `+` means space only in the query string.
fn decode_component(name: &str, raw: &str, form: bool) -> crate::Result<String> {
    let raw = if form {
        raw.replace('+', " ")
    } else {
        raw.to_string()
    };
    urlencoding::decode(&raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| {
            GatewayError::Validation(format!("parameter '{}' is not valid UTF-8", name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Program;

    fn block_hash_route() -> RouteSpec {
        RouteSpec::get("/get_block_hash.json/:index", "getblockhash")
            .params(vec![ParamSpec::path("index", ParamType::Integer)])
    }

    fn validation_message(result: crate::Result<Vec<String>>) -> String {
        match result {
            Err(GatewayError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_path_param() {
        let args = extract_args(&block_hash_route(), &[("index", "1000")], None).unwrap();
        assert_eq!(args, vec!["1000"]);
    }

    #[test]
    fn test_non_numeric_integer_rejected() {
        for bad in ["abc", "1.5", "", "10abc", "0x10"] {
            let msg = validation_message(extract_args(
                &block_hash_route(),
                &[("index", bad)],
                None,
            ));
            assert!(msg.contains("'index'"), "{}", msg);
            assert!(msg.contains("integer"), "{}", msg);
        }
    }

    #[test]
    fn test_metacharacters_rejected_for_every_type() {
        let route = RouteSpec::get("/x.json/:s", "x").params(vec![
            ParamSpec::path("s", ParamType::String),
            ParamSpec::optional("j", ParamType::Json),
        ]);
        for bad in ["a;b", "a%7Cb", "%60id%60", "%24(id)", "a%26%26b", "a%3Eout", "a%0Ab"] {
            let msg = validation_message(extract_args(&route, &[("s", bad)], None));
            assert!(msg.contains("disallowed"), "{}: {}", bad, msg);
        }
        let msg = validation_message(extract_args(
            &route,
            &[("s", "ok")],
            Some("j=%5B%22%24(id)%22%5D"),
        ));
        assert!(msg.contains("disallowed"), "{}", msg);
    }

    #[test]
    fn test_leading_dash_string_rejected() {
        let route = RouteSpec::get("/x.json/:s", "x")
            .params(vec![ParamSpec::path("s", ParamType::String)]);
        let msg = validation_message(extract_args(&route, &[("s", "-rpcconnect=evil")], None));
        assert!(msg.contains("'-'"), "{}", msg);
    }

    #[test]
    fn test_negative_integer_allowed() {
        let route = RouteSpec::get("/x.json", "x")
            .params(vec![ParamSpec::optional("blocks", ParamType::Integer)]);
        assert_eq!(
            extract_args(&route, &[], Some("blocks=-1")).unwrap(),
            vec!["-1"]
        );
    }

    #[test]
    fn test_missing_required_query_param() {
        let route = RouteSpec::get("/x.json", "x")
            .params(vec![ParamSpec::query("message", ParamType::String)]);
        let msg = validation_message(extract_args(&route, &[], None));
        assert_eq!(msg, "missing required parameter 'message'");
    }

    #[test]
    fn test_boolean_exact() {
        let route = RouteSpec::get("/x.json", "x")
            .params(vec![ParamSpec::optional("verbose", ParamType::Boolean)]);
        assert_eq!(
            extract_args(&route, &[], Some("verbose=false")).unwrap(),
            vec!["false"]
        );
        for bad in ["TRUE", "1", "yes", "True"] {
            let query = format!("verbose={}", bad);
            assert!(extract_args(&route, &[], Some(&query)).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_number_forwarded_as_given() {
        let route = RouteSpec::get("/x.json/:delta", "x")
            .params(vec![ParamSpec::path("delta", ParamType::Number)]);
        assert_eq!(
            extract_args(&route, &[("delta", "0.00010000")], None).unwrap(),
            vec!["0.00010000"]
        );
        for bad in ["NaN", "inf", "1e999", "abc", ".5", "+1"] {
            assert!(extract_args(&route, &[("delta", bad)], None).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_json_forwarded_compact() {
        let route = RouteSpec::get("/x.json", "x")
            .params(vec![ParamSpec::query("txids", ParamType::Json)]);
        let args = extract_args(&route, &[], Some("txids=%5B+%22ab%22%2C+%22cd%22+%5D")).unwrap();
        assert_eq!(args, vec![r#"["ab","cd"]"#]);
        assert!(extract_args(&route, &[], Some("txids=%5B")).is_err());
    }

    #[test]
    fn test_choice_param() {
        let route = RouteSpec::post("/add_node.json/:node/:command", "addnode").params(vec![
            ParamSpec::path("node", ParamType::String),
            ParamSpec::path("command", ParamType::Choice(&["add", "remove", "onetry"])),
        ]);
        assert_eq!(
            extract_args(&route, &[("node", "10.0.0.1:8333"), ("command", "onetry")], None)
                .unwrap(),
            vec!["10.0.0.1:8333", "onetry"]
        );
        let msg = validation_message(extract_args(
            &route,
            &[("node", "10.0.0.1"), ("command", "drop")],
            None,
        ));
        assert!(msg.contains("one of add|remove|onetry"), "{}", msg);
    }

    #[test]
    fn test_fixed_and_default_values_inserted_in_order() {
        let route = RouteSpec::get("/x.json/:hash", "x").params(vec![
            ParamSpec::path("hash", ParamType::String),
            ParamSpec::fixed("verbose", "false"),
            ParamSpec::optional("dns", ParamType::Boolean).or("true"),
        ]);
        assert_eq!(
            extract_args(&route, &[("hash", "00ab")], None).unwrap(),
            vec!["00ab", "false", "true"]
        );
        assert_eq!(
            extract_args(&route, &[("hash", "00ab")], Some("dns=false")).unwrap(),
            vec!["00ab", "false", "false"]
        );
    }

    #[test]
    fn test_positional_gap_rejected() {
        let route = RouteSpec::get("/x.json", "x").params(vec![
            ParamSpec::optional("check_level", ParamType::Integer),
            ParamSpec::optional("num_blocks", ParamType::Integer),
        ]);
        assert_eq!(
            extract_args(&route, &[], Some("check_level=3")).unwrap(),
            vec!["3"]
        );
        assert_eq!(
            extract_args(&route, &[], Some("num_blocks=6&check_level=3")).unwrap(),
            vec!["3", "6"]
        );
        let msg = validation_message(extract_args(&route, &[], Some("num_blocks=6")));
        assert!(msg.contains("'check_level'"), "{}", msg);
    }

    #[test]
    fn test_default_not_forwarded_after_gap() {
        let route = RouteSpec::get("/x.json", "x").params(vec![
            ParamSpec::optional("a", ParamType::Integer),
            ParamSpec::optional("b", ParamType::Boolean).or("true"),
        ]);
        assert!(extract_args(&route, &[], None).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_and_repeated_query_rejected() {
        let route = RouteSpec::get("/x.json", "x")
            .params(vec![ParamSpec::optional("verbose", ParamType::Boolean)]);
        let msg = validation_message(extract_args(&route, &[], Some("verbos=true")));
        assert!(msg.contains("unknown"), "{}", msg);
        let msg = validation_message(extract_args(
            &route,
            &[],
            Some("verbose=true&verbose=false"),
        ));
        assert!(msg.contains("more than once"), "{}", msg);
    }

    #[test]
    fn test_path_param_cannot_be_given_in_query() {
        let msg = validation_message(extract_args(
            &block_hash_route(),
            &[("index", "1")],
            Some("index=2"),
        ));
        assert!(msg.contains("unknown"), "{}", msg);
    }

    #[test]
    fn test_path_capture_percent_decoded() {
        let route = RouteSpec::post("/set_ban.json/:subnet", "setban")
            .params(vec![ParamSpec::path("subnet", ParamType::String)]);
        assert_eq!(
            extract_args(&route, &[("subnet", "10.0.0.0%2F24")], None).unwrap(),
            vec!["10.0.0.0/24"]
        );
    }

    #[test]
    fn test_query_plus_is_space() {
        let route = RouteSpec::get("/x.json", "x")
            .params(vec![ParamSpec::query("message", ParamType::String)]);
        assert_eq!(
            extract_args(&route, &[], Some("message=hello+world%21")).unwrap(),
            vec!["hello world!"]
        );
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let route = RouteSpec::get("/x.json/:s", "x")
            .params(vec![ParamSpec::path("s", ParamType::String)]);
        assert!(extract_args(&route, &[("s", "%FF%FE")], None).is_err());
    }

    #[test]
    fn test_build_invocation_carries_route_flags() {
        let route = RouteSpec::post("/start.json", "-daemon").daemon().sensitive();
        let inv = build_invocation(&route, vec!["x".to_string()]);
        assert_eq!(inv.program, Program::Daemon);
        assert_eq!(inv.verb, "-daemon");
        assert!(inv.sensitive);
        assert_eq!(inv.argv(), vec!["-daemon", "x"]);
    }
}
