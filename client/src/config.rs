//! Runtime configuration shared by every client instance

use crate::error::{ClientError, Result};
use shared::GameMode;

pub const DEFAULT_DIRECTORY_URL: &str = "http://zlap.io/servers.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Mode the session expects; setup packets announcing another mode fail
    pub mode: GameMode,
    /// Treat leftover bytes after a payload as a fatal decode error
    pub strict_trailing_bytes: bool,
    /// Directory servers with fewer players than this are skipped
    pub min_players: u32,
    pub directory_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::FreeForAll,
            strict_trailing_bytes: false,
            min_players: 1,
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        // The directory client is built without TLS
        if !self.directory_url.starts_with("http://") {
            return Err(ClientError::Config(format!(
                "directory url must use http://, got '{}'",
                self.directory_url
            )));
        }
        Ok(())
    }
}

/// Resolves an explicit `--address`/`--port` pair.
///
/// Both or neither must be given; `None` means the directory is consulted.
pub fn explicit_endpoint(
    address: Option<String>,
    port: Option<u16>,
) -> Result<Option<(String, u16)>> {
    match (address, port) {
        (Some(address), Some(port)) => Ok(Some((address, port))),
        (None, None) => Ok(None),
        _ => Err(ClientError::Config(
            "--address and --port must be given together".to_string(),
        )),
    }
}
