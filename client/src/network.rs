//! Connection driver: WebSocket frames in, session updates, replies out

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionStats};
use futures::{SinkExt, Stream, StreamExt};
use log::{debug, error, info, warn};
use shared::{OutboundPacket, ProtocolError};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Queue of encoded frames drained by the sender task.
///
/// Sending never waits on the socket, so replies cannot stall the receive
/// loop.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl Outbox {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Encodes and queues a packet. Unsupported packets are rejected with
    /// `ClientError::Encode`, which callers may treat as non-fatal.
    pub fn send(&self, packet: OutboundPacket) -> Result<()> {
        let frame = packet.encode()?;
        debug!("-> {}", packet.kind());
        self.tx.send(frame).map_err(|_| ClientError::OutboundClosed)
    }
}

/// Outcome of a session that ended with the server closing the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub stats: SessionStats,
    /// Players in the arena when the connection closed
    pub players: usize,
}

impl SessionSummary {
    fn of(session: &Session) -> Self {
        Self {
            stats: session.stats(),
            players: session.arena().map_or(0, |arena| arena.player_count()),
        }
    }
}

pub struct Client {
    socket: Socket,
    session: Session,
    config: ClientConfig,
    endpoint: String,
}

impl Client {
    pub async fn connect(address: &str, port: u16, config: ClientConfig) -> Result<Self> {
        let endpoint = format!("ws://{}:{}", address, port);
        info!("Connecting to {}", endpoint);

        let (socket, _response) = connect_async(endpoint.as_str()).await?;
        info!("Connected to {}", endpoint);

        Ok(Client {
            socket,
            session: Session::new(config.mode),
            config,
            endpoint,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Requests to play, then processes frames until the server closes the
    /// connection or the session fails
    pub async fn run(self) -> Result<SessionSummary> {
        let Client {
            socket,
            mut session,
            config,
            endpoint,
        } = self;

        let (mut sink, stream) = socket.split();
        let (outbox, mut outbound_rx) = Outbox::new();

        let sender = tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(Message::Binary(frame)).await {
                    error!("Failed to send frame: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let result = match outbox.send(OutboundPacket::Play) {
            Ok(()) => drive(&mut session, stream, &outbox, config.strict_trailing_bytes).await,
            Err(e) => {
                session.terminate();
                Err(e)
            }
        };

        drop(outbox);
        if let Err(e) = sender.await {
            warn!("Sender task for {} ended abnormally: {}", endpoint, e);
        }

        match &result {
            Ok(summary) => info!(
                "{} closed after {} packet(s), {} death(s)",
                endpoint, summary.stats.packets_applied, summary.stats.deaths
            ),
            Err(e) => error!("{} session failed: {}", endpoint, e),
        }
        result
    }
}

/// Feeds frames from `frames` through the session until the stream ends, a
/// close frame arrives, or a frame fails. The session is always terminated
/// on return.
pub async fn drive<S>(
    session: &mut Session,
    mut frames: S,
    outbox: &Outbox,
    strict_trailing_bytes: bool,
) -> Result<SessionSummary>
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    let result = loop {
        let Some(message) = frames.next().await else {
            debug!("Frame stream ended");
            break Ok(());
        };

        match message {
            Ok(Message::Binary(data)) => {
                if let Err(e) = handle_frame(session, &data, outbox, strict_trailing_bytes) {
                    break Err(e);
                }
            }
            Ok(Message::Text(text)) => {
                break Err(ProtocolError::UnexpectedFrameKind(format!(
                    "text frame of {} bytes",
                    text.len()
                ))
                .into());
            }
            Ok(Message::Close(frame)) => {
                info!("Server closed the connection: {:?}", frame);
                break Ok(());
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
            Err(e) => break Err(ClientError::Transport(e)),
        }
    };

    session.terminate();
    result.map(|()| SessionSummary::of(session))
}

/// Decodes one frame completely, then applies it
fn handle_frame(
    session: &mut Session,
    data: &[u8],
    outbox: &Outbox,
    strict_trailing_bytes: bool,
) -> Result<()> {
    let decoded = session.decode(data)?;

    let packet = if strict_trailing_bytes {
        decoded.into_strict()?
    } else {
        if let Some(drift) = decoded.trailing_error() {
            warn!("Tolerating protocol drift: {}", drift);
            session.record_trailing_bytes();
        }
        decoded.packet
    };

    debug!("<- {}", packet.kind());
    if let Some(reply) = session.apply(packet)? {
        match outbox.send(reply) {
            Err(ClientError::Encode(e)) => warn!("Dropping reply: {}", e),
            other => other?,
        }
    }
    Ok(())
}
