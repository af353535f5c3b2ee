use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

/// The env config env vars needed to reach the portal and the IdP.
#[derive(Debug, Deserialize)]
pub struct AppEnv {
    api_key: String,
    manada_user: String,
    manada_pwd: String,
    auth_url: String,
    manada_url: String,
}

/// Immutable process configuration, loaded once at startup and shared with
/// every request handler.
#[derive(Debug)]
pub struct AppConfig {
    pub api_key: String,
    pub manada_user: String,
    pub manada_pwd: String,
    pub auth_url: String,
    pub manada_url: String,
}

impl AppConfig {
    pub fn new() -> anyhow::Result<Self> {
        let app_env = AppEnv::load_from_env()?;
        let config = Self {
            api_key: app_env.api_key,
            manada_user: app_env.manada_user,
            manada_pwd: app_env.manada_pwd,
            auth_url: app_env.auth_url,
            manada_url: app_env.manada_url,
        };
        config.ensure_no_blanks()?;
        Ok(config)
    }

    // envy already rejects missing vars; vars set to an empty string are
    // just as fatal.
    fn ensure_no_blanks(&self) -> anyhow::Result<()> {
        let required = [
            ("API_KEY", &self.api_key),
            ("MANADA_USER", &self.manada_user),
            ("MANADA_PWD", &self.manada_pwd),
            ("AUTH_URL", &self.auth_url),
            ("MANADA_URL", &self.manada_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("required env var {name} is blank");
            }
        }
        Ok(())
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_config() -> AppConfig {
        AppConfig {
            api_key: "sekret".to_string(),
            manada_user: "u123456".to_string(),
            manada_pwd: "hunter2".to_string(),
            auth_url: "https://idp.example.ac.jp/idp/profile/SAML2/Redirect/SSO".to_string(),
            manada_url: "https://portal.example.ac.jp".to_string(),
        }
    }

    #[test]
    fn accepts_fully_populated_config() {
        assert!(filled_config().ensure_no_blanks().is_ok());
    }

    #[test]
    fn rejects_blank_var_by_name() {
        let mut config = filled_config();
        config.manada_pwd = "   ".to_string();
        let err = config.ensure_no_blanks().unwrap_err();
        assert!(err.to_string().contains("MANADA_PWD"));
    }
}
