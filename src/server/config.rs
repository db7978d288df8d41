use super::RequestsLoggingLevel;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Where uploaded photos are written, served under `/uploads`.
    pub uploads_dir: PathBuf,
    /// Run statistics recomputes of the same user one at a time.
    pub serialize_statistics_per_user: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3000,
            metrics_port: 9091,
            uploads_dir: PathBuf::from("uploads"),
            serialize_statistics_per_user: false,
        }
    }
}
