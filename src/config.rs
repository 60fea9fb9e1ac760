use thiserror::Error;

// Published sample credentials of the public error-injection test STS, not
// production secrets. Every value can be overridden from the environment.
const DEFAULT_ISSUER: &str = "https://testingsts.azurewebsites.net";
const DEFAULT_CLIENT_ID: &str = "client-001";
const DEFAULT_CLIENT_SECRET: &str = "secret-001";
const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000/auth/openid/return";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value `{0}`")]
    InvalidPort(String),
}

/// Relying-party configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Issuer base url; provider metadata is discovered from
    /// `{issuer}/.well-known/openid-configuration`.
    pub issuer: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_url: String,
    pub port: u16,
    /// Additional scopes besides `openid` (which is always requested).
    pub scopes: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            issuer: var_or("OIDC_ISSUER", DEFAULT_ISSUER),
            client_id: var_or("OIDC_CLIENT_ID", DEFAULT_CLIENT_ID),
            client_secret: Some(var_or("OIDC_CLIENT_SECRET", DEFAULT_CLIENT_SECRET)),
            redirect_url: var_or("OIDC_REDIRECT_URL", DEFAULT_REDIRECT_URL),
            port,
            scopes: parse_scopes(&var_or("OIDC_SCOPES", "")),
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::parse_scopes;

    #[test]
    fn scopes_split_on_whitespace() {
        assert_eq!(parse_scopes("profile email"), vec!["profile", "email"]);
        assert!(parse_scopes("").is_empty());
        assert!(parse_scopes("   ").is_empty());
    }
}
