//! Access control enforcement for matched routes.
//!
//! Deny-first guard over command verbs, with a switch that shuts off every
//! state-mutating (POST) route at once. Deny overrides allow.

use std::fmt;

use crate::config::AccessConfig;
use crate::registry::RouteSpec;

/// Access control decision for a matched route.
///
/// Mapped to `GatewayError::AccessDenied` by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    /// Verb matched an explicit deny entry.
    ExplicitDeny { verb: String },
    /// Route mutates node state and mutating routes are disabled.
    MutatingDisabled { verb: String },
    /// Allow list is non-empty and the verb is not on it.
    NotInAllowList { verb: String },
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDenied::ExplicitDeny { verb } => {
                write!(f, "command '{}' is explicitly denied", verb)
            }
            AccessDenied::MutatingDisabled { verb } => write!(
                f,
                "command '{}' mutates node state. Set access.allow_mutating = true to allow.",
                verb
            ),
            AccessDenied::NotInAllowList { verb } => {
                write!(f, "command '{}' is not in the allow list", verb)
            }
        }
    }
}

/// Access guard enforcing deny-first verb lists and the mutating-route switch.
///
/// Evaluation order (strict priority):
/// 1. Deny list: explicit verb matches always block (highest priority)
/// 2. Mutating switch: POST routes blocked unless `allow_mutating`
/// 3. Allow list: if non-empty, the verb must be listed
/// 4. Pass: no restrictions matched
#[derive(Debug, Clone)]
pub struct AccessGuard {
    allow: Vec<String>,
    deny: Vec<String>,
    allow_mutating: bool,
}

impl AccessGuard {
    pub fn new(config: &AccessConfig) -> Self {
        AccessGuard {
            allow: config.allow.clone(),
            deny: config.deny.clone(),
            allow_mutating: config.allow_mutating,
        }
    }

    /// A guard that lets every route through.
    pub fn permissive() -> Self {
        Self::new(&AccessConfig::default())
    }

    /// Check whether the matched route may run.
    pub fn check(&self, route: &RouteSpec) -> std::result::Result<(), AccessDenied> {
        let verb = route.verb;

        if self.deny.iter().any(|d| d == verb) {
            return Err(AccessDenied::ExplicitDeny {
                verb: verb.to_string(),
            });
        }

        if route.is_mutating() && !self.allow_mutating {
            return Err(AccessDenied::MutatingDisabled {
                verb: verb.to_string(),
            });
        }

        if !self.allow.is_empty() && !self.allow.iter().any(|a| a == verb) {
            return Err(AccessDenied::NotInAllowList {
                verb: verb.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(allow: Vec<&str>, deny: Vec<&str>, allow_mutating: bool) -> AccessGuard {
        AccessGuard::new(&AccessConfig {
            allow: allow.into_iter().map(String::from).collect(),
            deny: deny.into_iter().map(String::from).collect(),
            allow_mutating,
        })
    }

    fn get(verb: &'static str) -> RouteSpec {
        RouteSpec::get("/x.json", verb)
    }

    fn post(verb: &'static str) -> RouteSpec {
        RouteSpec::post("/x.json", verb)
    }

    #[test]
    fn test_deny_overrides_allow() {
        let guard = guard(vec!["stop", "getblockcount"], vec!["stop"], true);
        assert!(guard.check(&get("getblockcount")).is_ok());
        assert!(matches!(
            guard.check(&post("stop")),
            Err(AccessDenied::ExplicitDeny { .. })
        ));
    }

    #[test]
    fn test_mutating_blocked_when_disabled() {
        let guard = guard(vec![], vec![], false);
        assert!(guard.check(&get("getblockcount")).is_ok());
        let result = guard.check(&post("sendrawtransaction"));
        assert!(matches!(result, Err(AccessDenied::MutatingDisabled { .. })));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("access.allow_mutating")
        );
    }

    #[test]
    fn test_empty_allow_list_means_allow_all() {
        let guard = AccessGuard::permissive();
        assert!(guard.check(&get("getblockcount")).is_ok());
        assert!(guard.check(&post("sendrawtransaction")).is_ok());
        assert!(guard.check(&post("stop")).is_ok());
    }

    #[test]
    fn test_not_in_allow_list_blocked() {
        let guard = guard(vec!["getblockcount", "getblockhash"], vec![], true);
        assert!(guard.check(&get("getblockhash")).is_ok());
        assert!(matches!(
            guard.check(&get("getpeerinfo")),
            Err(AccessDenied::NotInAllowList { .. })
        ));
    }
}
