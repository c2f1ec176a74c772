//! Server directory lookup
//!
//! The game publishes its servers as JSON: a list of groups, each a list of
//! servers with their address, protocol version, mode and population.

use crate::config::ClientConfig;
use log::{debug, info};
use serde::Deserialize;
use shared::{GameMode, CLIENT_VERSION};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed listing: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("server {address} runs unsupported version {version}")]
    UnsupportedVersion { address: String, version: String },

    #[error("no {mode} server with at least {min_players} player(s)")]
    NoServer { mode: GameMode, min_players: u32 },

    #[error("invalid server address '{0}'")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerListing {
    /// `host:port`
    pub address: String,
    pub version: String,
    /// Left as text so servers running modes this client does not know are
    /// skipped rather than failing the whole listing
    pub mode: String,
    pub players: u32,
}

pub type ServerGroups = Vec<Vec<ServerListing>>;

pub fn parse_listing(body: &str) -> Result<ServerGroups, DirectoryError> {
    Ok(serde_json::from_str(body)?)
}

/// Splits `host:port`
pub fn parse_address(address: &str) -> Result<(String, u16), DirectoryError> {
    let invalid = || DirectoryError::InvalidAddress(address.to_string());
    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}

/// Picks the first server, in listing order, that runs `mode` with at least
/// `min_players` players.
///
/// A server on another protocol version means this client is out of date,
/// so it fails the lookup instead of being skipped.
pub fn select_server(
    groups: &[Vec<ServerListing>],
    mode: GameMode,
    min_players: u32,
) -> Result<(String, u16), DirectoryError> {
    for server in groups.iter().flatten() {
        if server.version != CLIENT_VERSION {
            return Err(DirectoryError::UnsupportedVersion {
                address: server.address.clone(),
                version: server.version.clone(),
            });
        }
        if server.mode != mode.as_str() {
            continue;
        }
        if server.players < min_players {
            debug!("Skipping {} with {} player(s)", server.address, server.players);
            continue;
        }
        return parse_address(&server.address);
    }

    Err(DirectoryError::NoServer { mode, min_players })
}

/// Downloads the listing, bypassing caches with a timestamp query
pub async fn fetch_listing(url: &str) -> Result<ServerGroups, DirectoryError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let body = reqwest::get(format!("{}?_={}", url, millis))
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_listing(&body)
}

pub async fn find_server(config: &ClientConfig) -> Result<(String, u16), DirectoryError> {
    info!("Looking up a {} server at {}", config.mode, config.directory_url);
    let groups = fetch_listing(&config.directory_url).await?;
    select_server(&groups, config.mode, config.min_players)
}
