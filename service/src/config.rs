use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default Reclique API base URL used when `RECLIQUE_BASE_URL` is not set.
pub const DEFAULT_RECLIQUE_BASE_URL: &str = "https://api.reclique.com";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The OAuth client id registered with Reclique.
    #[arg(long, env)]
    reclique_client_id: Option<String>,

    /// The OAuth client secret registered with Reclique.
    #[arg(long, env, hide_env_values = true)]
    reclique_client_secret: Option<String>,

    /// The base URL of the Reclique API. The authorize, token and profile endpoints are
    /// derived from it unless overridden individually.
    #[arg(long, env, default_value = DEFAULT_RECLIQUE_BASE_URL)]
    reclique_base_url: String,

    /// Overrides the Reclique authorization endpoint.
    #[arg(long, env)]
    reclique_authorize_url: Option<String>,

    /// Overrides the Reclique token endpoint.
    #[arg(long, env)]
    reclique_token_url: Option<String>,

    /// Overrides the Reclique member profile endpoint.
    #[arg(long, env)]
    reclique_userinfo_url: Option<String>,

    /// The callback URL registered with Reclique, pointing at this server's callback route.
    #[arg(long, env)]
    reclique_redirect_uri: Option<String>,

    /// Scopes requested during authorization.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "read"
    )]
    pub reclique_scopes: Vec<String>,

    /// Membership statuses that grant access to gated content (case-insensitive).
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "active"
    )]
    pub reclique_active_statuses: Vec<String>,

    /// Timeout in seconds for each call to the Reclique token and profile endpoints
    #[arg(long, env, default_value_t = 10)]
    pub provider_timeout_secs: u64,

    /// Seconds an issued CSRF state stays valid while the user is at the provider
    #[arg(long, env, default_value_t = 600)]
    pub csrf_state_ttl_secs: i64,

    /// Where members with an eligible subscription land after login.
    #[arg(long, env, default_value = "/virtual-y")]
    virtual_y_url: String,

    /// The Virtual Y login page members without a subscription are sent back to.
    #[arg(long, env, default_value = "/virtual-y/login")]
    virtual_y_login_url: String,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Session expiry duration in seconds of inactivity (default: 1 hour)
    #[arg(long, env, default_value_t = 3600)]
    pub session_expiry_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parse from an explicit argument list, skipping the `.env` file.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::parse_from(args)
    }

    pub fn set_reclique_client(mut self, client_id: String, client_secret: String) -> Self {
        self.reclique_client_id = Some(client_id);
        self.reclique_client_secret = Some(client_secret);
        self
    }

    pub fn set_reclique_base_url(mut self, base_url: String) -> Self {
        self.reclique_base_url = base_url;
        self
    }

    pub fn set_reclique_redirect_uri(mut self, redirect_uri: String) -> Self {
        self.reclique_redirect_uri = Some(redirect_uri);
        self
    }

    pub fn set_virtual_y_urls(mut self, success_url: String, login_url: String) -> Self {
        self.virtual_y_url = success_url;
        self.virtual_y_login_url = login_url;
        self
    }

    pub fn reclique_client_id(&self) -> Option<String> {
        self.reclique_client_id.clone()
    }

    pub fn reclique_client_secret(&self) -> Option<String> {
        self.reclique_client_secret.clone()
    }

    pub fn reclique_base_url(&self) -> &str {
        &self.reclique_base_url
    }

    pub fn reclique_authorize_url(&self) -> Option<String> {
        self.reclique_authorize_url.clone()
    }

    pub fn reclique_token_url(&self) -> Option<String> {
        self.reclique_token_url.clone()
    }

    pub fn reclique_userinfo_url(&self) -> Option<String> {
        self.reclique_userinfo_url.clone()
    }

    pub fn reclique_redirect_uri(&self) -> Option<String> {
        self.reclique_redirect_uri.clone()
    }

    /// Returns the post-login landing URL.
    pub fn virtual_y_url(&self) -> &str {
        &self.virtual_y_url
    }

    /// Returns the login page members are returned to when access is denied.
    pub fn virtual_y_login_url(&self) -> &str {
        &self.virtual_y_login_url
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["reclique_login"];
        argv.extend_from_slice(args);
        Config::from_args(argv)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.reclique_base_url(), DEFAULT_RECLIQUE_BASE_URL);
        assert_eq!(config.reclique_scopes, vec!["read".to_string()]);
        assert_eq!(config.reclique_active_statuses, vec!["active".to_string()]);
        assert_eq!(config.virtual_y_url(), "/virtual-y");
        assert_eq!(config.virtual_y_login_url(), "/virtual-y/login");
        assert_eq!(config.csrf_state_ttl_secs, 600);
        assert_eq!(config.provider_timeout_secs, 10);
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn test_list_arguments_split_on_commas() {
        let config = parse(&[
            "--reclique-scopes",
            "read,profile",
            "--reclique-active-statuses",
            "active,grace",
        ]);
        assert_eq!(config.reclique_scopes, vec!["read", "profile"]);
        assert_eq!(config.reclique_active_statuses, vec!["active", "grace"]);
    }

    #[test]
    fn test_setters() {
        let config = parse(&[])
            .set_reclique_client("id".to_string(), "secret".to_string())
            .set_reclique_redirect_uri("https://y.example.org/cb".to_string())
            .set_virtual_y_urls("/home".to_string(), "/login".to_string());

        assert_eq!(config.reclique_client_id(), Some("id".to_string()));
        assert_eq!(config.reclique_client_secret(), Some("secret".to_string()));
        assert_eq!(
            config.reclique_redirect_uri(),
            Some("https://y.example.org/cb".to_string())
        );
        assert_eq!(config.virtual_y_url(), "/home");
        assert_eq!(config.virtual_y_login_url(), "/login");
    }

    #[test]
    fn test_rust_env_parsing() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
        assert!(parse(&["--runtime-env", "production"]).is_production());
    }
}
