//! Server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Result, RouteError};
use crate::files::StaticFiles;
use crate::router::Router;

/// A static files mount, registered in the order it appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Route template, declaring no variables or a `filepath` one
    pub template: String,

    /// Directory to serve from; defaults to the document root
    pub root: Option<PathBuf>,
}

impl MountConfig {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            root: None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory files are served from
    pub document_root: PathBuf,

    /// Document served for `/`
    pub index: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Static mounts, most specific first
    pub mounts: Vec<MountConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            document_root: PathBuf::from("."),
            index: "index.html".to_string(),
            log_level: "info".to_string(),
            mounts: vec![MountConfig::new("/"), MountConfig::new("/<path:filepath>")],
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Get the socket address to listen on
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse::<SocketAddr>()?)
    }

    /// Builds the router serving every mount, in configuration order.
    ///
    /// Relative mount roots are resolved against the document root.
    pub fn router(&self) -> std::result::Result<Router, RouteError> {
        self.mounts.iter().try_fold(Router::default(), |router, mount| {
            let root = match &mount.root {
                Some(root) => self.document_root.join(root),
                None => self.document_root.clone(),
            };
            let files = StaticFiles::new(root).with_index(self.index.as_str());
            router.serve_files(&mount.template, files)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TemplateError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.index, "index.html");
        assert_eq!(config.mounts.len(), 2);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");

        let config = ServerConfig {
            host: "not an address".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.socket_addr(), Err(Error::Addr(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            port = 9000
            document_root = "/srv/www"

            [[mounts]]
            template = "/js/<path:filepath>"
            root = "js"

            [[mounts]]
            template = "/"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.document_root, PathBuf::from("/srv/www"));
        assert_eq!(
            config.mounts,
            vec![
                MountConfig {
                    template: "/js/<path:filepath>".to_string(),
                    root: Some(PathBuf::from("js")),
                },
                MountConfig::new("/"),
            ]
        );
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"host = \"127.0.0.1\"\nlog_level = \"debug\"\n")
            .unwrap();

        let loaded = ServerConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.host, "127.0.0.1");
        assert_eq!(loaded.log_level, "debug");
    }

    #[test]
    fn test_to_file_round_trip() {
        let config = ServerConfig {
            port: 9090,
            document_root: PathBuf::from("/srv/site"),
            mounts: vec![
                MountConfig {
                    template: "/js/<path:filepath>".to_string(),
                    root: Some(PathBuf::from("js")),
                },
                MountConfig::new("/<path:filepath>"),
            ],
            ..Default::default()
        };

        let temp_file = NamedTempFile::new().unwrap();
        config.to_file(temp_file.path()).unwrap();
        let loaded = ServerConfig::from_file(temp_file.path()).unwrap();

        assert_eq!(loaded.port, 9090);
        assert_eq!(loaded.host, config.host);
        assert_eq!(loaded.document_root, config.document_root);
        assert_eq!(loaded.mounts, config.mounts);
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            ServerConfig::from_toml("port = \"eighty\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_file("/definitely/not/here.toml"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_router_keeps_mount_order() {
        let config = ServerConfig::default();
        let router = config.router().unwrap();
        assert_eq!(
            router.templates().collect::<Vec<_>>(),
            ["/", "/<path:filepath>"]
        );
        assert_eq!(router.dispatch("/").unwrap().template(), "/");
        assert_eq!(
            router.dispatch("/css/site.css").unwrap().params().get("filepath"),
            Some("css/site.css")
        );
    }

    #[test]
    fn test_router_rejects_bad_mount() {
        let config = ServerConfig {
            mounts: vec![MountConfig::new("/<path:filepath")],
            ..Default::default()
        };
        assert!(matches!(
            config.router(),
            Err(RouteError::Template(TemplateError::UnclosedPlaceholder { .. }))
        ));
    }
}
