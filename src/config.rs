//! Gateway configuration: deserialization and validation.
//!
//! Consumed once at startup. Every section has defaults, so an empty file (or
//! no file at all) yields a runnable configuration for a local `bitcoin-cli`.

use crate::error::GatewayError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Strip an env var reference to its variable name.
///
/// Accepts `${VAR_NAME}` syntax only. Returns `None` if the value is not a
/// valid env-var reference.
pub fn parse_env_ref(value: &str) -> Option<&str> {
    value.strip_prefix("${").and_then(|s| s.strip_suffix('}'))
}

/// Resolve a map of env-var references to their actual values.
///
/// Unknown variables resolve to the empty string (same as shell `${UNSET-}`).
pub fn resolve_env_vars(env: &HashMap<String, String>) -> HashMap<String, String> {
    env.iter()
        .map(|(k, v)| {
            let resolved = match parse_env_ref(v) {
                Some(var_name) => std::env::var(var_name).unwrap_or_default(),
                None => v.clone(), // caught by validate(), but handle gracefully
            };
            (k.clone(), resolved)
        })
        .collect()
}

/// Top-level gateway configuration, parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where the shared Basic credential pair comes from.
///
/// Both values must be `${VAR}` references; the variables are read once when
/// the dispatcher is built.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_username_ref")]
    pub username: String,
    #[serde(default = "default_password_ref")]
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username_ref(),
            password: default_password_ref(),
        }
    }
}

/// How to reach the node's command-line front-end.
///
/// The front-end is run via `tokio::process::Command` (never a shell) as
/// `<cli_command> <args...> <verb> <route args...>`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// The CLI front-end executable (e.g., "bitcoin-cli").
    #[serde(default = "default_cli_command")]
    pub cli_command: String,
    /// The daemon executable, used only by the node-start route.
    #[serde(default = "default_daemon_command")]
    pub daemon_command: String,
    /// Global flags placed before the verb on every invocation (e.g., ["-regtest"]).
    #[serde(default)]
    pub args: Vec<String>,
    /// Env var references (`${VAR}`), resolved at startup.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Timeout for ordinary queries.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,
    /// Timeout for routes declared slow (chain verification, UTXO-set statistics).
    #[serde(default = "default_slow_timeout_secs")]
    pub slow_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            cli_command: default_cli_command(),
            daemon_command: default_daemon_command(),
            args: Vec::new(),
            env: HashMap::new(),
            default_timeout_secs: default_timeout_secs(),
            slow_timeout_secs: default_slow_timeout_secs(),
        }
    }
}

impl NodeConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn slow_timeout(&self) -> Duration {
        Duration::from_secs(self.slow_timeout_secs)
    }
}

/// Verb-level access control applied after route match.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// Allowed verbs (empty means allow all).
    #[serde(default)]
    pub allow: Vec<String>,
    /// Denied verbs (highest priority, overrides allow).
    #[serde(default)]
    pub deny: Vec<String>,
    /// Whether POST (state-mutating) routes may run at all.
    #[serde(default = "default_allow_mutating")]
    pub allow_mutating: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: Vec::new(),
            allow_mutating: default_allow_mutating(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4567
}

fn default_username_ref() -> String {
    "${BLOCKCHAIN_PROXY_USERNAME}".to_string()
}

fn default_password_ref() -> String {
    "${BLOCKCHAIN_PROXY_PASSWORD}".to_string()
}

fn default_cli_command() -> String {
    "bitcoin-cli".to_string()
}

fn default_daemon_command() -> String {
    "bitcoind".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_slow_timeout_secs() -> u64 {
    300
}

fn default_allow_mutating() -> bool {
    true
}

impl GatewayConfig {
    /// Parse a TOML document into a config. Does not validate.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| GatewayError::InvalidConfig(e.to_string()))
    }

    /// Read, parse and validate a config file.
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GatewayError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config, failing fast on misconfigurations before anything is served.
    pub fn validate(&self) -> crate::Result<()> {
        // 1. Listener
        if self.server.host.trim().is_empty() {
            return Err(GatewayError::InvalidConfig(
                "server.host must not be empty".to_string(),
            ));
        }

        // 2. Credentials must be env references, never literals in the file
        for (field, value) in [
            ("auth.username", &self.auth.username),
            ("auth.password", &self.auth.password),
        ] {
            match parse_env_ref(value) {
                Some(name) if !name.is_empty() => {}
                _ => {
                    return Err(GatewayError::InvalidConfig(format!(
                        "{} must be a ${{VAR}} reference",
                        field
                    )));
                }
            }
        }

        // 3. Node executables
        if self.node.cli_command.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "node.cli_command must not be empty".to_string(),
            ));
        }
        if self.node.daemon_command.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "node.daemon_command must not be empty".to_string(),
            ));
        }

        // 4. Env var references: must be ${VAR}
        for (key, value) in &self.node.env {
            if parse_env_ref(value).is_none() {
                return Err(GatewayError::InvalidConfig(format!(
                    "node.env value for key '{}' must be a ${{VAR}} reference, got '{}'",
                    key, value
                )));
            }
        }

        // 5. Timeouts
        if self.node.default_timeout_secs == 0 || self.node.slow_timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "node timeouts must be > 0".to_string(),
            ));
        }
        if self.node.slow_timeout_secs < self.node.default_timeout_secs {
            return Err(GatewayError::InvalidConfig(format!(
                "node.slow_timeout_secs ({}) is shorter than node.default_timeout_secs ({})",
                self.node.slow_timeout_secs, self.node.default_timeout_secs
            )));
        }

        // 6. A verb cannot be both allowed and denied
        if let Some(verb) = self
            .access
            .deny
            .iter()
            .find(|verb| self.access.allow.contains(verb))
        {
            return Err(GatewayError::InvalidConfig(format!(
                "verb '{}' is listed in both access.allow and access.deny",
                verb
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_toml(toml_str: &str) -> GatewayConfig {
        GatewayConfig::from_toml_str(toml_str).expect("valid TOML")
    }

    #[test]
    fn test_parse_env_ref() {
        assert_eq!(parse_env_ref("${FOO}"), Some("FOO"));
        assert_eq!(
            parse_env_ref("${BLOCKCHAIN_PROXY_USERNAME}"),
            Some("BLOCKCHAIN_PROXY_USERNAME")
        );
        assert_eq!(parse_env_ref("$FOO"), None);
        assert_eq!(parse_env_ref("literal"), None);
        assert_eq!(parse_env_ref("${}"), Some(""));
    }

    #[test]
    fn test_resolve_env_vars() {
        // SAFETY: test-only, no concurrent threads depend on this env var.
        unsafe { std::env::set_var("GATEWAY_TEST_DATADIR", "/srv/node") };
        let mut env = HashMap::new();
        env.insert("DATADIR".to_string(), "${GATEWAY_TEST_DATADIR}".to_string());
        let resolved = resolve_env_vars(&env);
        assert_eq!(resolved.get("DATADIR").unwrap(), "/srv/node");
        // SAFETY: test-only cleanup.
        unsafe { std::env::remove_var("GATEWAY_TEST_DATADIR") };
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_toml("");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4567);
        assert_eq!(config.auth.username, "${BLOCKCHAIN_PROXY_USERNAME}");
        assert_eq!(config.auth.password, "${BLOCKCHAIN_PROXY_PASSWORD}");
        assert_eq!(config.node.cli_command, "bitcoin-cli");
        assert_eq!(config.node.default_timeout(), Duration::from_secs(5));
        assert!(config.access.allow_mutating);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_document() {
        let config = parse_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8332

            [node]
            cli_command = "/usr/local/bin/bitcoin-cli"
            args = ["-regtest", "-rpcwait"]
            slow_timeout_secs = 600

            [node.env]
            BITCOIN_DATADIR = "${NODE_DATADIR}"

            [access]
            deny = ["stop"]
            allow_mutating = false
            "#,
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8332);
        assert_eq!(config.node.args, vec!["-regtest", "-rpcwait"]);
        assert_eq!(config.node.slow_timeout(), Duration::from_secs(600));
        assert_eq!(config.access.deny, vec!["stop"]);
        assert!(!config.access.allow_mutating);
    }

    #[test]
    fn test_literal_password_rejected() {
        let config = parse_toml(
            r#"
            [auth]
            password = "hunter2"
            "#,
        );
        let result = config.validate();
        assert!(
            matches!(result, Err(GatewayError::InvalidConfig(msg)) if msg.contains("auth.password"))
        );
    }

    #[test]
    fn test_node_env_reference_required() {
        let config = parse_toml(
            r#"
            [node.env]
            RPC_PASSWORD = "literal-secret"
            "#,
        );
        let result = config.validate();
        assert!(
            matches!(result, Err(GatewayError::InvalidConfig(msg)) if msg.contains("RPC_PASSWORD"))
        );
    }

    #[test]
    fn test_slow_timeout_shorter_than_default_rejected() {
        let config = parse_toml(
            r#"
            [node]
            default_timeout_secs = 30
            slow_timeout_secs = 10
            "#,
        );
        let result = config.validate();
        assert!(
            matches!(result, Err(GatewayError::InvalidConfig(msg)) if msg.contains("slow_timeout_secs"))
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = parse_toml(
            r#"
            [node]
            default_timeout_secs = 0
            "#,
        );
        assert!(matches!(
            config.validate(),
            Err(GatewayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_verb_in_allow_and_deny_rejected() {
        let config = parse_toml(
            r#"
            [access]
            allow = ["getblockcount", "stop"]
            deny = ["stop"]
            "#,
        );
        let result = config.validate();
        assert!(
            matches!(result, Err(GatewayError::InvalidConfig(msg)) if msg.contains("'stop'"))
        );
    }

    #[test]
    fn test_unknown_field_type_is_parse_error() {
        let result = GatewayConfig::from_toml_str(
            r#"
            [server]
            port = "not-a-port"
            "#,
        );
        assert!(matches!(result, Err(GatewayError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            port = 8332

            [node]
            args = ["-regtest"]
            "#,
        )
        .unwrap();
        let config = GatewayConfig::load(&path).await.unwrap();
        assert_eq!(config.server.port, 8332);
        assert_eq!(config.node.args, vec!["-regtest"]);
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[auth]\npassword = \"hunter2\"\n").unwrap();
        assert!(matches!(
            GatewayConfig::load(&path).await,
            Err(GatewayError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = GatewayConfig::load(&dir.path().join("absent.toml")).await;
        assert!(matches!(result, Err(GatewayError::InvalidConfig(msg)) if msg.contains("cannot read")));
    }
}
