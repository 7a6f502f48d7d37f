//! A single concurrent WebSocket session with the server.
//!
//! A genuine background reader task and an async dialer own the socket, so
//! the socket itself is owned by two spawned tokio tasks; the `Transport`
//! handle only holds a sender into the writer task's queue and a receiver
//! out of the reader task's bounded inbox. Mutual exclusion becomes a small
//! `parking_lot` guard around a `closed` flag — checked before every send,
//! never held across the actual socket write, which lives entirely inside
//! the writer task.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

use protocol::envelope::{Envelope, RawFrame};
use protocol::OutboundMessage;

use crate::error::{DialError, TransportError};

struct SharedState {
    closed: bool,
}

/// A single duplex session with the server. Cloning is cheap — all clones
/// share the same underlying socket and tasks.
#[derive(Clone)]
pub struct Transport {
    shared: Arc<Mutex<SharedState>>,
    outbound_tx: mpsc::UnboundedSender<WsMessage>,
    inbound_rx: Arc<Mutex<mpsc::Receiver<Envelope>>>,
}

impl Transport {
    /// Performs the handshake: attaches the bearer token both as
    /// an `Authorization` header and as a `token=` query parameter, dials
    /// with a 5s timeout, and spawns the reader/writer tasks.
    pub async fn dial(
        url: &str,
        token: &str,
        inbox_capacity: usize,
        dial_timeout: Duration,
    ) -> Result<Transport, DialError> {
        let request = build_request(url, token)?;

        let connect = tokio_tungstenite::connect_async(request);
        let (ws_stream, _response) = tokio::time::timeout(dial_timeout, connect)
            .await
            .map_err(|_| DialError::Timeout(dial_timeout))?
            .map_err(|e| DialError::Handshake(e.to_string()))?;

        let (sink, stream) = ws_stream.split();
        let shared = Arc::new(Mutex::new(SharedState { closed: false }));
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::channel(inbox_capacity);

        tokio::spawn(writer_task(sink, outbound_rx, shared.clone()));
        tokio::spawn(reader_task(stream, inbound_tx, shared.clone()));

        Ok(Transport {
            shared,
            outbound_tx,
            inbound_rx: Arc::new(Mutex::new(inbound_rx)),
        })
    }

    /// Serializes `{type, data}` and enqueues a single framed text message.
    /// Fire-and-forget from the caller's perspective past this point — the
    /// write itself happens on the writer task.
    pub fn send(&self, msg: OutboundMessage) -> Result<(), TransportError> {
        {
            let guard = self.shared.lock();
            if guard.closed {
                return Err(TransportError::Closed);
            }
        }
        let text = msg
            .encode()
            .map_err(|e| TransportError::Write(e.to_string()))?;
        self.outbound_tx
            .send(WsMessage::Text(text.into()))
            .map_err(|_| TransportError::Closed)
    }

    /// Drains whatever inbound frames have arrived since the last call,
    /// without blocking. Intended to be called once per UI tick by the
    /// Envelope Router.
    pub fn try_recv(&self) -> Option<Envelope> {
        self.inbound_rx.lock().try_recv().ok()
    }

    /// Idempotent. After this returns, `send` fails with `Closed` and no
    /// further frames will arrive.
    pub fn close(&self) {
        let mut guard = self.shared.lock();
        if guard.closed {
            return;
        }
        guard.closed = true;
        drop(guard);
        let _ = self.outbound_tx.send(WsMessage::Close(None));
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

fn build_request(url: &str, token: &str) -> Result<http::Request<()>, DialError> {
    let mut parsed = url::Url::parse(url).map_err(|e| DialError::InvalidUrl(e.to_string()))?;
    parsed.query_pairs_mut().append_pair("token", token);

    let mut request = parsed
        .as_str()
        .into_client_request()
        .map_err(|e| DialError::Handshake(e.to_string()))?;

    let header_value = format!("Bearer {token}")
        .parse()
        .map_err(|_| DialError::Handshake("invalid token header value".to_string()))?;
    request
        .headers_mut()
        .insert(http::header::AUTHORIZATION, header_value);

    Ok(request)
}

type WsSink = futures_util::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    WsMessage,
>;
type WsStream = futures_util::stream::SplitStream<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
>;

async fn writer_task(
    mut sink: WsSink,
    mut outbound_rx: mpsc::UnboundedReceiver<WsMessage>,
    shared: Arc<Mutex<SharedState>>,
) {
    while let Some(msg) = outbound_rx.recv().await {
        let is_close = matches!(msg, WsMessage::Close(_));
        if let Err(e) = sink.send(msg).await {
            warn!(error = %e, "transport write failed, closing session");
            shared.lock().closed = true;
            break;
        }
        if is_close {
            let _ = sink.close().await;
            break;
        }
    }
    debug!("writer task exiting");
}

async fn reader_task(
    mut stream: WsStream,
    inbound_tx: mpsc::Sender<Envelope>,
    shared: Arc<Mutex<SharedState>>,
) {
    loop {
        let next = stream.next().await;
        match next {
            Some(Ok(WsMessage::Text(text))) => {
                match serde_json::from_str::<RawFrame>(&text) {
                    Ok(frame) => match Envelope::decode(frame) {
                        Ok(envelope) => {
                            if inbound_tx.send(envelope).await.is_err() {
                                break; // Transport (and its inbox) was dropped.
                            }
                        }
                        Err(e) => {
                            // Decode failure on a recognized type: log, discard, continue.
                            warn!(error = %e, "failed to decode inbound frame");
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "failed to parse inbound frame as JSON");
                    }
                }
            }
            Some(Ok(WsMessage::Close(_))) | None => {
                debug!("transport closed by peer");
                shared.lock().closed = true;
                break;
            }
            Some(Ok(_)) => {
                // Ping/Pong/Binary/Frame — ignore, keep reading.
            }
            Some(Err(e)) => {
                warn!(error = %e, "transport read error, closing session");
                shared.lock().closed = true;
                break;
            }
        }
    }
    debug!("reader task exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_request_attaches_header_and_query() {
        let request = build_request("ws://example.test/ws", "tok-123").unwrap();
        let auth = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(auth, "Bearer tok-123");
        let uri = request.uri().to_string();
        assert!(uri.contains("token=tok-123"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = build_request("not a url", "tok").unwrap_err();
        assert!(matches!(err, DialError::InvalidUrl(_)));
    }
}
