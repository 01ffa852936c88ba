//! HTTP Basic authentication against credentials resolved at startup.

use std::fmt;

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::{parse_env_ref, AuthConfig};
use crate::error::GatewayError;

/// Realm advertised in the `WWW-Authenticate` challenge.
pub const REALM: &str = "Restricted Area";

/// Full `WWW-Authenticate` value sent with every 401.
pub const CHALLENGE: &str = "Basic realm=\"Restricted Area\"";

/// The one username/password pair every request must present.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Resolve `${VAR}` references from the process environment.
    ///
    /// Called once at startup; an unset or empty variable refuses startup.
    pub fn resolve(config: &AuthConfig) -> crate::Result<Self> {
        Ok(Self {
            username: resolve_secret(&config.username)?,
            password: resolve_secret(&config.password)?,
        })
    }

    /// Check the `Authorization` header of a request.
    pub fn verify(&self, headers: &HeaderMap) -> crate::Result<()> {
        let (username, password) =
            parse_basic(headers).ok_or(GatewayError::Authentication)?;

        // Evaluate both so the outcome does not reveal which field was wrong.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if user_ok & pass_ok {
            Ok(())
        } else {
            Err(GatewayError::Authentication)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"[redacted]")
            .field("password", &"[redacted]")
            .finish()
    }
}

fn resolve_secret(reference: &str) -> crate::Result<String> {
    let var = parse_env_ref(reference).ok_or_else(|| {
        GatewayError::InvalidConfig(format!(
            "credential '{}' must be a ${{VAR}} reference",
            reference
        ))
    })?;
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(GatewayError::MissingCredential(var.to_string())),
    }
}

/// Decode `Authorization: Basic <base64(user:pass)>`.
fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (&x, &y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
