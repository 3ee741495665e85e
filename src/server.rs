//! TCP edge: accepts connections and shuttles JSON lines in and out.
//!
//! Each connection gets a reader loop (inbound lines dispatched into the
//! shared registry) and a writer task draining the connection's outbox.
//! Malformed or unknown messages are logged and dropped; the connection
//! stays open. No failure here terminates the server process.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::board::Board;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{ConnId, Registry};

/// Shared handle to the registry. A single lock serializes every mutating
/// operation, which is the whole concurrency contract: dispatch is
/// synchronous and never held across an await.
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// Binds the listener and runs the accept loop forever.
#[instrument]
pub async fn run(host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!(host, port, "sausage server listening");

    let registry: SharedRegistry = Arc::new(Mutex::new(Registry::new(Board::default())));
    let mut next_id: ConnId = 0;

    loop {
        let (stream, addr) = listener.accept().await?;
        next_id += 1;
        let id = next_id;
        info!(conn = id, %addr, "client connected");
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            handle_connection(id, stream, registry).await;
        });
    }
}

/// Drives one connection from registration to removal.
async fn handle_connection(id: ConnId, stream: TcpStream, registry: SharedRegistry) {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Writer task: drains the outbox as JSON lines and exits once the
    // registry drops the sender on disconnect. Sends are fire-and-forget;
    // an IO error just stops the drain.
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let mut line = match serde_json::to_vec(&msg) {
                Ok(line) => line,
                Err(error) => {
                    warn!(%error, "dropping unserializable message");
                    continue;
                }
            };
            line.push(b'\n');
            if writer.write_all(&line).await.is_err() {
                break;
            }
        }
    });

    registry.lock().unwrap().connect(id, tx);

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientMessage>(&line) {
                    Ok(msg) => registry.lock().unwrap().dispatch(id, msg),
                    Err(error) => {
                        warn!(conn = id, %error, "ignoring malformed message");
                    }
                }
            }
            Ok(None) => break,
            Err(error) => {
                debug!(conn = id, %error, "read failed");
                break;
            }
        }
    }

    info!(conn = id, "client disconnected");
    registry.lock().unwrap().disconnect(id);
}
