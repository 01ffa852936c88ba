//! Output normalization: maps a finished node command onto the response body
//! declared by its route's output shape, or onto an upstream error.

use serde_json::json;

use crate::error::GatewayError;
use crate::node::CommandResult;
use crate::registry::{OutputShape, RouteSpec, Scalar};

/// Message returned in place of stderr for sensitive routes.
const REDACTED_FAILURE: &str = "node command failed (details redacted)";

/// Turn a command result into the JSON body for `route`.
pub fn normalize(route: &RouteSpec, result: CommandResult) -> crate::Result<Vec<u8>> {
    if !result.success() {
        return Err(upstream_failure(route, &result));
    }

    let stdout = String::from_utf8(result.stdout).map_err(|_| {
        GatewayError::UpstreamProtocol(format!("'{}' produced non-UTF-8 output", route.verb))
    })?;

    match route.output {
        OutputShape::PassthroughJson => passthrough(route, stdout),
        OutputShape::WrapScalar { key, scalar } => wrap_scalar(route, key, scalar, &stdout),
        OutputShape::WrapBoolean { key } => match stdout.trim() {
            "true" => Ok(object(key, "true")),
            "false" => Ok(object(key, "false")),
            _ => Err(protocol_error(route, "a boolean")),
        },
        OutputShape::Acknowledge => Ok(json!({ "acknowledged": true }).to_string().into_bytes()),
    }
}

fn passthrough(route: &RouteSpec, stdout: String) -> crate::Result<Vec<u8>> {
    // The front-end prints nothing for a null result.
    if stdout.trim().is_empty() {
        return Ok(b"null".to_vec());
    }
    serde_json::from_str::<serde::de::IgnoredAny>(&stdout)
        .map_err(|_| protocol_error(route, "a JSON document"))?;
    Ok(stdout.into_bytes())
}

fn wrap_scalar(
    route: &RouteSpec,
    key: &str,
    scalar: Scalar,
    stdout: &str,
) -> crate::Result<Vec<u8>> {
    let value = stdout.trim_end();
    match scalar {
        Scalar::Text if value.is_empty() => Ok(object(key, "null")),
        Scalar::Text => Ok(object(key, &serde_json::Value::from(value).to_string())),
        Scalar::Number => {
            let number = value.trim_start();
            if serde_json::from_str::<serde_json::Number>(number).is_err() {
                return Err(protocol_error(route, "a number"));
            }
            // Emitted as printed so amounts keep their precision.
            Ok(object(key, number))
        }
    }
}

/// `{"<key>":<raw JSON value>}`
fn object(key: &str, raw_value: &str) -> Vec<u8> {
    format!("{{{}:{}}}", serde_json::Value::from(key), raw_value).into_bytes()
}

fn protocol_error(route: &RouteSpec, expected: &str) -> GatewayError {
    GatewayError::UpstreamProtocol(format!(
        "'{}' output is not {} ({})",
        route.verb, expected, route.output
    ))
}

fn upstream_failure(route: &RouteSpec, result: &CommandResult) -> GatewayError {
    let message = if route.sensitive {
        REDACTED_FAILURE.to_string()
    } else {
        let stderr = result.stderr_trimmed();
        match (stderr.is_empty(), result.exit_code) {
            (false, _) => stderr,
            (true, Some(code)) => format!("'{}' exited with status {}", route.verb, code),
            (true, None) => format!("'{}' was terminated by a signal", route.verb),
        }
    };
    GatewayError::UpstreamCommand {
        message,
        exit_code: result.exit_code,
    }
}
