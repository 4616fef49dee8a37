use crate::agent::gemini::DEFAULT_MODEL;
use crate::errors::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://gemini_chat.db?mode=rwc";
const DEFAULT_PORT: u16 = 3000;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub database_url: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `lookup` returns the raw value of a variable, if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::MissingConfig { name: "GEMINI_API_KEY".to_string() })?;

        let gemini_model = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| AppError::InvalidConfig {
                name: "PORT".to_string(),
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { gemini_api_key, gemini_model, database_url, port })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn api_key_is_required() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, AppError::MissingConfig { ref name } if name == "GEMINI_API_KEY"));

        let err = config(&[("GEMINI_API_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, AppError::MissingConfig { .. }));
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("GEMINI_API_KEY", "k")]).unwrap();
        assert_eq!(cfg.gemini_api_key, "k");
        assert_eq!(cfg.gemini_model, DEFAULT_MODEL);
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.port, 3000);
    }

    #[test]
    fn overrides_apply() {
        let cfg = config(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-1.5-flash"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(cfg.gemini_model, "gemini-1.5-flash");
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config(&[("GEMINI_API_KEY", "k"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { ref name, .. } if name == "PORT"));
    }
}
