use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use http::{Request, Uri};
use rsa::RsaPrivateKey;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::handshake::client::generate_key;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use crate::auth;
use crate::platforms::{field_str, json_i64};

pub const PROD_WS_URL: &str = "wss://api.elections.kalshi.com/trade-api/ws/v2";
pub const DEMO_WS_URL: &str = "wss://demo-api.kalshi.co/trade-api/ws/v2";
/// Path signed for the WebSocket handshake.
const WS_SIGN_PATH: &str = "/trade-api/ws/v2";
const PING_INTERVAL: Duration = Duration::from_secs(10);
const RECONNECT_BASE: Duration = Duration::from_secs(2);
const RECONNECT_MAX: Duration = Duration::from_secs(60);

type WsResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A fill pushed on the `fill` channel.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEvent {
    pub trade_id: String,
    pub ticker: String,
    pub side: String,
    pub action: String,
    pub count: i64,
    pub price_cents: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Fill(FillEvent),
    Error(String),
    Other,
}

pub struct StreamCredentials {
    pub key_id: String,
    pub private_key: Arc<RsaPrivateKey>,
}

fn subscribe_cmd() -> String {
    serde_json::json!({
        "id": 1,
        "cmd": "subscribe",
        "params": {
            "channels": ["fill"]
        }
    })
    .to_string()
}

/// Classify one text frame. Unparseable frames are `Other`.
pub fn parse_stream_message(text: &str) -> StreamMessage {
    let Ok(message) = serde_json::from_str::<Value>(text) else {
        return StreamMessage::Other;
    };

    match field_str(&message, "type") {
        Some("fill") => {
            let data = message.get("msg").unwrap_or(&message);
            StreamMessage::Fill(parse_fill(data))
        }
        Some("error") => StreamMessage::Error(
            message
                .get("msg")
                .map(|m| m.to_string())
                .unwrap_or_else(|| message.to_string()),
        ),
        _ => StreamMessage::Other,
    }
}

fn parse_fill(data: &Value) -> FillEvent {
    let side = field_str(data, "side").unwrap_or("unknown").to_lowercase();
    let side_price_key = if side == "no" { "no_price" } else { "yes_price" };
    FillEvent {
        trade_id: field_str(data, "trade_id").unwrap_or("").to_string(),
        ticker: field_str(data, "market_ticker")
            .or_else(|| field_str(data, "ticker"))
            .unwrap_or("Unknown")
            .to_string(),
        side: side.to_uppercase(),
        action: field_str(data, "action").unwrap_or("").to_uppercase(),
        count: data.get("count").and_then(json_i64).unwrap_or(0),
        price_cents: data
            .get("price")
            .or_else(|| data.get(side_price_key))
            .and_then(json_i64)
            .unwrap_or(0),
    }
}

/// Spawn the fill listener. Reconnects forever with exponential backoff;
/// stops once the receiver is dropped.
pub fn spawn_fill_stream(ws_url: &str, creds: StreamCredentials) -> mpsc::UnboundedReceiver<FillEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let ws_url = ws_url.to_string();

    tokio::spawn(async move {
        let mut backoff = RECONNECT_BASE;

        loop {
            let clean_close = match connect_and_listen(&tx, &ws_url, &creds).await {
                Ok(()) if tx.is_closed() => break,
                Ok(()) => {
                    warn!("fill stream disconnected, reconnecting");
                    true
                }
                Err(e) => {
                    error!(error = %e, ?backoff, "fill stream error, reconnecting");
                    false
                }
            };
            let (delay, next) = reconnect_plan(clean_close, backoff);
            tokio::time::sleep(delay).await;
            backoff = next;
        }
    });

    rx
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(RECONNECT_MAX)
}

/// Delay before the next connect, and the backoff after it. A clean close
/// still waits the base delay and resets the backoff.
fn reconnect_plan(clean_close: bool, backoff: Duration) -> (Duration, Duration) {
    if clean_close {
        (RECONNECT_BASE, RECONNECT_BASE)
    } else {
        (backoff, next_backoff(backoff))
    }
}

/// Handshake request with freshly signed auth headers.
fn handshake_request(ws_url: &str, creds: &StreamCredentials) -> WsResult<Request<()>> {
    let uri: Uri = ws_url.parse()?;
    let host = uri.host().ok_or("WebSocket URL has no host")?.to_string();

    let signed = auth::sign_with_key("GET", WS_SIGN_PATH, &creds.key_id, &creds.private_key)?;

    let mut builder = Request::builder()
        .method("GET")
        .uri(uri)
        .header("Host", host)
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header("Sec-WebSocket-Key", generate_key());
    for (name, value) in signed.pairs() {
        builder = builder.header(name, value);
    }
    Ok(builder.body(())?)
}

async fn connect_and_listen(
    tx: &mpsc::UnboundedSender<FillEvent>,
    ws_url: &str,
    creds: &StreamCredentials,
) -> WsResult<()> {
    let request = handshake_request(ws_url, creds)?;
    let (ws_stream, _) = connect_async(request).await?;
    let (mut write, mut read) = ws_stream.split();

    write.send(Message::Text(subscribe_cmd())).await?;
    info!("subscribed to fill channel");

    let (write_tx, mut write_rx) = mpsc::unbounded_channel::<Message>();

    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = write_rx.recv().await {
            if write.send(msg).await.is_err() {
                break;
            }
        }
    });

    let ping_write_tx = write_tx.clone();
    let ping_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(PING_INTERVAL);
        loop {
            interval.tick().await;
            if ping_write_tx.send(Message::Ping(vec![])).is_err() {
                break;
            }
        }
    });

    let result = loop {
        let Some(msg) = read.next().await else {
            break Ok(());
        };
        match msg {
            Ok(Message::Text(text)) => match parse_stream_message(&text) {
                StreamMessage::Fill(fill) => {
                    if tx.send(fill).is_err() {
                        break Ok(());
                    }
                }
                StreamMessage::Error(detail) => error!(%detail, "fill stream error message"),
                StreamMessage::Other => {}
            },
            Ok(Message::Ping(data)) => {
                let _ = write_tx.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => break Ok(()),
            Err(e) => break Err(e.into()),
            _ => {}
        }
    };

    ping_task.abort();
    writer_handle.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_targets_fill_channel() {
        let cmd: Value = serde_json::from_str(&subscribe_cmd()).unwrap();
        assert_eq!(cmd["id"], 1);
        assert_eq!(cmd["cmd"], "subscribe");
        assert_eq!(cmd["params"]["channels"][0], "fill");
    }

    #[test]
    fn fill_message_is_parsed() {
        let text = r#"{"type":"fill","sid":13,"msg":{"trade_id":"d91bc706","market_ticker":"KXNFLGAME-25DEC15KCBAL-KC","side":"yes","action":"buy","count":278,"yes_price":75,"no_price":25}}"#;
        match parse_stream_message(text) {
            StreamMessage::Fill(fill) => {
                assert_eq!(fill.ticker, "KXNFLGAME-25DEC15KCBAL-KC");
                assert_eq!(fill.side, "YES");
                assert_eq!(fill.action, "BUY");
                assert_eq!(fill.count, 278);
                assert_eq!(fill.price_cents, 75);
            }
            other => panic!("expected fill, got {:?}", other),
        }
    }

    #[test]
    fn explicit_price_wins_and_no_side_uses_no_price() {
        let with_price = r#"{"type":"fill","msg":{"ticker":"KX-A","side":"no","count":1,"price":12,"no_price":30}}"#;
        let StreamMessage::Fill(fill) = parse_stream_message(with_price) else {
            panic!("expected fill");
        };
        assert_eq!(fill.price_cents, 12);
        assert_eq!(fill.ticker, "KX-A");

        let no_side = r#"{"type":"fill","msg":{"ticker":"KX-A","side":"no","count":1,"yes_price":70,"no_price":30}}"#;
        let StreamMessage::Fill(fill) = parse_stream_message(no_side) else {
            panic!("expected fill");
        };
        assert_eq!(fill.price_cents, 30);
    }

    #[test]
    fn fill_without_msg_envelope_reads_top_level() {
        let text = r#"{"type":"fill","ticker":"KX-B","side":"yes","count":2,"price":55}"#;
        let StreamMessage::Fill(fill) = parse_stream_message(text) else {
            panic!("expected fill");
        };
        assert_eq!(fill.ticker, "KX-B");
        assert_eq!(fill.count, 2);
    }

    #[test]
    fn error_and_noise_frames() {
        let err = parse_stream_message(r#"{"type":"error","msg":{"code":6,"msg":"Already subscribed"}}"#);
        assert!(matches!(err, StreamMessage::Error(ref s) if s.contains("Already subscribed")));
        assert_eq!(parse_stream_message(r#"{"type":"subscribed","id":1}"#), StreamMessage::Other);
        assert_eq!(parse_stream_message("not json"), StreamMessage::Other);
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        assert_eq!(next_backoff(RECONNECT_BASE), Duration::from_secs(4));
        assert_eq!(next_backoff(Duration::from_secs(40)), RECONNECT_MAX);
        assert_eq!(next_backoff(RECONNECT_MAX), RECONNECT_MAX);
    }

    #[test]
    fn clean_close_still_waits_before_reconnecting() {
        let (delay, next) = reconnect_plan(true, Duration::from_secs(32));
        assert_eq!(delay, RECONNECT_BASE);
        assert_eq!(next, RECONNECT_BASE);
        assert!(delay > Duration::ZERO);
    }

    #[test]
    fn errors_wait_current_backoff_then_double() {
        let (delay, next) = reconnect_plan(false, Duration::from_secs(8));
        assert_eq!(delay, Duration::from_secs(8));
        assert_eq!(next, Duration::from_secs(16));
    }

    #[test]
    fn handshake_carries_fresh_auth_headers() {
        let creds = StreamCredentials {
            key_id: "kid".into(),
            private_key: Arc::new(crate::auth::tests::test_key()),
        };
        let request = handshake_request(PROD_WS_URL, &creds).unwrap();
        let headers = request.headers();
        assert_eq!(headers.get("Host").unwrap(), "api.elections.kalshi.com");
        assert_eq!(headers.get(auth::ACCESS_KEY_HEADER).unwrap(), "kid");
        assert!(headers.contains_key(auth::ACCESS_SIGNATURE_HEADER));
        assert!(headers.contains_key(auth::ACCESS_TIMESTAMP_HEADER));
    }
}
