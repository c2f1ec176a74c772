//! # Arena Game Client Library
//!
//! This library connects to an arena game server over a WebSocket, decodes
//! the server's compact binary protocol and keeps a local mirror of the
//! arena in step with the server's authoritative view. The only decision it
//! makes on its own is to ask to play again after the local player dies.
//!
//! ## Architecture Overview
//!
//! ### Stateful Decoding
//! The wire format cannot be parsed from bytes alone. Whether a sync entry
//! carries an introduction block, and whether that block starts with a name,
//! depends on which players the client already knows and which one it
//! controls. The [`session::Session`] answers those questions for the codec
//! in the `shared` crate while each frame is being decoded.
//!
//! ### Decode, Then Apply
//! Every frame is decoded into a complete packet before it touches the arena,
//! and every packet is validated before it mutates anything. A frame either
//! lands in full or the session ends with the arena as it was.
//!
//! ### One Session Per Connection
//! Each connection owns its session and arena outright. Several instances can
//! run side by side without sharing any state.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The arena mirror: players, their maces, and the rules that keep the local
//! player in the arena across deaths and duplicate removals.
//!
//! ### Session Module (`session`)
//! The `AwaitingSetup → Active → Terminated` state machine that applies
//! packets in arrival order.
//!
//! ### Network Module (`network`)
//! The connection driver: reads frames, feeds them through the session and
//! queues replies for a sender task so the receive loop never waits on a
//! write.
//!
//! ### Directory Module (`directory`)
//! Server discovery from the published server listing.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::ClientConfig;
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let (address, port) = client::directory::find_server(&config).await?;
//!
//!     let client = Client::connect(&address, port, config).await?;
//!     let summary = client.run().await?;
//!     println!("{} packets applied", summary.stats.packets_applied);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod game;
pub mod network;
pub mod session;

pub use error::{ClientError, Result};
