//! Wire framing.
//!
//! The editor speaks MessagePack-RPC: back-to-back MessagePack arrays with no
//! delimiter, `[0, id, method, params]` for requests, `[1, id, error, result]`
//! for responses and `[2, method, params]` for notifications. Line-delimited
//! JSON-RPC 2.0 is kept for tooling that prefers text. Both framings decode
//! into the same [`IncomingMessage`], so nothing above this module knows
//! which one is on the wire.

use std::io::{self, Cursor};

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{FrameError, TransportError};
use crate::jsonrpc::{IncomingMessage, Request, Response, RpcError};

/// Largest single inbound frame.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

const MSGPACK_REQUEST: u64 = 0;
const MSGPACK_RESPONSE: u64 = 1;
const MSGPACK_NOTIFICATION: u64 = 2;

/// How messages are delimited on the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// MessagePack-RPC, as spoken by Neovim.
    #[default]
    MessagePack,
    /// One JSON-RPC 2.0 document per line.
    JsonLines,
}

impl Framing {
    /// Encode a request, or a notification when `id` is `None`.
    pub fn encode_request(
        self,
        id: Option<u64>,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Vec<u8>, TransportError> {
        match self {
            Framing::JsonLines => json_line(&Request::new(id, method, args)),
            Framing::MessagePack => {
                let params = rmpv::Value::Array(args.iter().map(to_msgpack).collect());
                let frame = match id {
                    Some(id) => vec![
                        rmpv::Value::from(MSGPACK_REQUEST),
                        rmpv::Value::from(id),
                        rmpv::Value::from(method),
                        params,
                    ],
                    None => vec![
                        rmpv::Value::from(MSGPACK_NOTIFICATION),
                        rmpv::Value::from(method),
                        params,
                    ],
                };
                msgpack_bytes(&rmpv::Value::Array(frame))
            }
        }
    }

    /// Encode the answer to a call the peer made.
    pub fn encode_response(
        self,
        id: u64,
        result: Option<Value>,
        error: Option<RpcError>,
    ) -> Result<Vec<u8>, TransportError> {
        match self {
            Framing::JsonLines => json_line(&Response {
                jsonrpc: "2.0".to_string(),
                result,
                error,
                id: Some(id),
            }),
            Framing::MessagePack => {
                let error = error.map_or(rmpv::Value::Nil, |e| {
                    rmpv::Value::Array(vec![
                        rmpv::Value::from(e.code),
                        rmpv::Value::from(e.message.as_str()),
                    ])
                });
                let result = result.as_ref().map_or(rmpv::Value::Nil, to_msgpack);
                msgpack_bytes(&rmpv::Value::Array(vec![
                    rmpv::Value::from(MSGPACK_RESPONSE),
                    rmpv::Value::from(id),
                    error,
                    result,
                ]))
            }
        }
    }
}

fn json_line<T: Serialize>(msg: &T) -> Result<Vec<u8>, TransportError> {
    let mut bytes = serde_json::to_vec(msg)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn msgpack_bytes(value: &rmpv::Value) -> Result<Vec<u8>, TransportError> {
    let mut bytes = Vec::new();
    rmpv::encode::write_value(&mut bytes, value)
        .map_err(|e| TransportError::EncodeMsgPack(e.to_string()))?;
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Buffers stream bytes and yields complete messages.
pub struct FrameDecoder {
    framing: Framing,
    buf: Vec<u8>,
    limit: usize,
    /// Bytes of `buf` already searched for a newline.
    scanned: usize,
    /// Skipping the remainder of an oversize line.
    discarding: bool,
}

impl FrameDecoder {
    pub fn new(framing: Framing) -> Self {
        Self::with_limit(framing, MAX_FRAME_LEN)
    }

    pub fn with_limit(framing: Framing, limit: usize) -> Self {
        Self {
            framing,
            buf: Vec::new(),
            limit,
            scanned: 0,
            discarding: false,
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// The next complete message, or `Ok(None)` until more bytes arrive.
    pub fn next_message(&mut self) -> Result<Option<IncomingMessage>, FrameError> {
        match self.framing {
            Framing::JsonLines => self.next_line(),
            Framing::MessagePack => self.next_msgpack(),
        }
    }

    fn next_line(&mut self) -> Result<Option<IncomingMessage>, FrameError> {
        loop {
            let found = self.buf[self.scanned..].iter().position(|b| *b == b'\n');
            let Some(end) = found.map(|i| self.scanned + i) else {
                if self.discarding {
                    self.buf.clear();
                } else if self.buf.len() > self.limit {
                    self.buf.clear();
                    self.discarding = true;
                    self.scanned = 0;
                    return Err(FrameError::Oversize { limit: self.limit });
                }
                self.scanned = self.buf.len();
                return Ok(None);
            };

            let line: Vec<u8> = self.buf.drain(..=end).collect();
            self.scanned = 0;
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if line.len() > self.limit + 1 {
                return Err(FrameError::Oversize { limit: self.limit });
            }

            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            return serde_json::from_str(text)
                .map(Some)
                .map_err(|e| FrameError::Malformed(e.to_string()));
        }
    }

    fn next_msgpack(&mut self) -> Result<Option<IncomingMessage>, FrameError> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let decoded = {
            let mut cursor = Cursor::new(self.buf.as_slice());
            rmpv::decode::read_value(&mut cursor).map(|value| (value, cursor.position()))
        };

        match decoded {
            Ok((value, position)) => {
                let consumed = usize::try_from(position).unwrap_or(self.buf.len());
                self.buf.drain(..consumed);
                message_from_msgpack(value).map(Some)
            }
            Err(e) if is_incomplete(&e) => {
                if self.buf.len() > self.limit {
                    return Err(FrameError::Corrupt(format!(
                        "frame exceeds {} bytes",
                        self.limit
                    )));
                }
                Ok(None)
            }
            Err(e) => Err(FrameError::Corrupt(e.to_string())),
        }
    }
}

fn is_incomplete(err: &rmpv::decode::Error) -> bool {
    match err {
        rmpv::decode::Error::InvalidMarkerRead(e) | rmpv::decode::Error::InvalidDataRead(e) => {
            e.kind() == io::ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}

fn message_from_msgpack(value: rmpv::Value) -> Result<IncomingMessage, FrameError> {
    let rmpv::Value::Array(items) = value else {
        return Err(FrameError::Malformed("message is not an array".to_string()));
    };
    let mut items = items.into_iter();
    let kind = items.next().and_then(|v| v.as_u64());

    let mut msg = IncomingMessage {
        jsonrpc: "2.0".to_string(),
        id: None,
        method: None,
        params: None,
        result: None,
        error: None,
    };

    match kind {
        Some(MSGPACK_REQUEST) => {
            msg.id = Some(next_id(&mut items)?);
            msg.method = Some(next_method(&mut items)?);
            msg.params = items.next().map(from_msgpack);
        }
        Some(MSGPACK_RESPONSE) => {
            msg.id = Some(next_id(&mut items)?);
            msg.error = items
                .next()
                .filter(|e| !e.is_nil())
                .map(error_from_msgpack);
            msg.result = items.next().map(from_msgpack).filter(|r| !r.is_null());
        }
        Some(MSGPACK_NOTIFICATION) => {
            msg.method = Some(next_method(&mut items)?);
            msg.params = items.next().map(from_msgpack);
        }
        other => {
            return Err(FrameError::Malformed(format!(
                "unknown message type {other:?}"
            )));
        }
    }
    Ok(msg)
}

fn next_id(items: &mut impl Iterator<Item = rmpv::Value>) -> Result<u64, FrameError> {
    items
        .next()
        .and_then(|v| v.as_u64())
        .ok_or_else(|| FrameError::Malformed("missing message id".to_string()))
}

fn next_method(items: &mut impl Iterator<Item = rmpv::Value>) -> Result<String, FrameError> {
    items
        .next()
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| FrameError::Malformed("missing method name".to_string()))
}

/// Neovim reports errors as `[type, message]`.
fn error_from_msgpack(value: rmpv::Value) -> RpcError {
    if let rmpv::Value::Array(parts) = &value
        && let [kind, message] = parts.as_slice()
        && let (Some(code), Some(message)) = (kind.as_i64(), message.as_str())
    {
        return RpcError {
            code,
            message: message.to_string(),
            data: None,
        };
    }
    let message = match from_msgpack(value) {
        Value::String(s) => s,
        other => other.to_string(),
    };
    RpcError {
        code: -32000,
        message,
        data: None,
    }
}

/// Convert a JSON value into its MessagePack equivalent.
pub fn to_msgpack(value: &Value) -> rmpv::Value {
    match value {
        Value::Null => rmpv::Value::Nil,
        Value::Bool(b) => rmpv::Value::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                rmpv::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                rmpv::Value::from(u)
            } else {
                rmpv::Value::F64(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => rmpv::Value::from(s.as_str()),
        Value::Array(items) => rmpv::Value::Array(items.iter().map(to_msgpack).collect()),
        Value::Object(map) => rmpv::Value::Map(
            map.iter()
                .map(|(k, v)| (rmpv::Value::from(k.as_str()), to_msgpack(v)))
                .collect(),
        ),
    }
}

/// Convert a MessagePack value into JSON.
///
/// Binary strings become text (lossily), and extension values (the editor's
/// buffer, window and tabpage handles) become the integer they wrap.
pub fn from_msgpack(value: rmpv::Value) -> Value {
    match value {
        rmpv::Value::Nil => Value::Null,
        rmpv::Value::Boolean(b) => Value::Bool(b),
        rmpv::Value::Integer(i) => i
            .as_i64()
            .map(Value::from)
            .or_else(|| i.as_u64().map(Value::from))
            .unwrap_or(Value::Null),
        rmpv::Value::F32(f) => float(f64::from(f)),
        rmpv::Value::F64(f) => float(f),
        rmpv::Value::String(s) => Value::String(String::from_utf8_lossy(s.as_bytes()).into_owned()),
        rmpv::Value::Binary(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        rmpv::Value::Array(items) => Value::Array(items.into_iter().map(from_msgpack).collect()),
        rmpv::Value::Map(pairs) => {
            let mut map = Map::with_capacity(pairs.len());
            for (key, value) in pairs {
                let key = match from_msgpack(key) {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                map.insert(key, from_msgpack(value));
            }
            Value::Object(map)
        }
        rmpv::Value::Ext(_, data) => rmpv::decode::read_value(&mut data.as_slice())
            .map(from_msgpack)
            .unwrap_or(Value::Null),
    }
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}
