// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig, ServerConfig,
    StaticPathConfig, ViewsConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.default_content_type", "text/html")?
            .set_default("http.server_name", "resource_server/0.1")?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.http.default_content_type, "text/html");
        assert_eq!(config.http.max_body_size, 10_485_760);
        assert!(config.views.dir.is_none());
        assert!(config.routes.static_paths.is_empty());
        assert_eq!(config.routes.index_files, vec!["index.html", "index.htm"]);
        assert_eq!(
            config.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("config.toml")).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[http]
server_name = "Brewery/2"

[views]
dir = "views"

[[routes.static_paths]]
prefix = "/assets"
dir = "public"
"#
        )
        .unwrap();

        let path = dir.path().join("config");
        let config = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.http.server_name, "Brewery/2");
        assert_eq!(config.views.dir.as_deref(), Some("views"));
        assert_eq!(
            config.routes.static_paths,
            vec![StaticPathConfig {
                prefix: "/assets".to_string(),
                dir: "public".to_string()
            }]
        );
        assert_eq!(config.routes.static_routes()[0].prefix, "/assets");
    }

    #[test]
    fn test_invalid_address() {
        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.server.host = "not an ip".to_string();
        assert!(config.get_socket_addr().is_err());
    }
}
