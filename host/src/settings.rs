use plinko_core::RiskLevel;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_BALANCE_FILE: &str = "balance.txt";

/// Server settings, read from `PLINKO_*` environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// `PLINKO_BIND`
    pub bind_address: String,
    /// `PLINKO_BALANCE_FILE`
    pub balance_file: PathBuf,
    /// `PLINKO_RISK`: preset used when a request names none
    pub default_risk: RiskLevel,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            balance_file: PathBuf::from(DEFAULT_BALANCE_FILE),
            default_risk: RiskLevel::default(),
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(bind) = get("PLINKO_BIND") {
            if !bind.contains(':') {
                return Err(format!(
                    "Invalid PLINKO_BIND '{}': expected <host>:<port>",
                    bind
                ));
            }
            settings.bind_address = bind;
        }

        if let Some(file) = get("PLINKO_BALANCE_FILE") {
            settings.balance_file = PathBuf::from(file);
        }

        if let Some(risk) = get("PLINKO_RISK") {
            settings.default_risk = RiskLevel::from_str(risk.trim())?;
        }

        Ok(settings)
    }
}
