//! AMF viewer
//!
//! Decodes a Flash remoting envelope (AMF0 encoding) and shows it as JSON.
//! AMF3 payloads are not supported and are declined.

use crate::error::{Error, Result};
use crate::lines::{render_text, truncate, Rendered};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};
use tracing::debug;

const MAX_DEPTH: usize = 64;

/// Decoded size allowed per input byte; references may not expand past it
const MAX_EXPANSION: usize = 16;

/// Reply target suffixes and the status each one stands for
const RESPONSE_SUFFIXES: &[(&str, u8)] = &[
    ("/onResult", 0),
    ("/onStatus", 1),
    ("/onDebugEvents", 2),
];

mod marker {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const REFERENCE: u8 = 0x07;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
    pub const STRICT_ARRAY: u8 = 0x0A;
    pub const DATE: u8 = 0x0B;
    pub const LONG_STRING: u8 = 0x0C;
    pub const UNSUPPORTED: u8 = 0x0D;
    pub const XML_DOCUMENT: u8 = 0x0F;
    pub const TYPED_OBJECT: u8 = 0x10;
    pub const AVMPLUS: u8 = 0x11;
}

/// JSON output node; objects built here keep insertion order
enum Node {
    Value(Value),
    Object(Vec<(String, Node)>),
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Value(v) => v.serialize(serializer),
            Node::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// One remoting message
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Message {
    /// Client call: key is the response id, `target` the service method
    Request {
        key: String,
        target: String,
        body: Value,
    },
    /// Server reply: key is the request id, `status` from the target suffix
    Response { key: String, status: u8, body: Value },
}

/// Decoded remoting envelope
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Envelope {
    pub version: u16,
    pub headers: Vec<(String, bool, Value)>,
    pub messages: Vec<Message>,
}

impl Envelope {
    fn to_node(&self) -> Node {
        let mut out = vec![("amfVersion".to_string(), Node::Value(self.version.into()))];
        for message in &self.messages {
            let (key, first, body) = match message {
                Message::Request { key, target, body } => {
                    (key, ("target", Value::String(target.clone())), body)
                }
                Message::Response { key, status, body } => {
                    (key, ("status", Value::from(*status)), body)
                }
            };
            let fields = vec![
                (first.0.to_string(), Node::Value(first.1)),
                ("body".to_string(), Node::Value(body.clone())),
            ];
            // a later message with the same key replaces the earlier one
            out.retain(|(k, _)| k != key);
            out.push((key.clone(), Node::Object(fields)));
        }
        Node::Object(out)
    }

    /// Render as JSON with four-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.to_node().serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Referenceable values with their decoded weight
    refs: Vec<(Value, usize)>,
    depth: usize,
    /// Weight decoded so far: one per node plus string bytes
    spent: usize,
    budget: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            refs: Vec::new(),
            depth: 0,
            spent: 0,
            budget: data.len().saturating_mul(MAX_EXPANSION),
        }
    }

    fn charge(&mut self, weight: usize) -> Result<()> {
        self.spent = self.spent.saturating_add(weight);
        if self.spent > self.budget {
            return Err(Error::amf_at(
                format!("decoded size exceeds {} units", self.budget),
                self.pos,
            ));
        }
        Ok(())
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::amf_at("unexpected end of data", self.pos));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f64(&mut self) -> Result<f64> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(f64::from_be_bytes(raw))
    }

    fn utf8(&mut self, len: usize) -> Result<String> {
        let at = self.pos;
        let bytes = self.take(len)?;
        self.charge(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::amf_at("invalid UTF-8 string", at))
    }

    fn short_string(&mut self) -> Result<String> {
        let len = self.u16()? as usize;
        self.utf8(len)
    }

    fn long_string(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        self.utf8(len)
    }

    fn number(value: f64) -> Value {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }

    /// Key/value pairs up to the empty-key end marker
    fn properties(&mut self, map: &mut Map<String, Value>) -> Result<()> {
        loop {
            let key = self.short_string()?;
            if key.is_empty() {
                let at = self.pos;
                return match self.u8()? {
                    marker::OBJECT_END => Ok(()),
                    m => Err(Error::amf_at(format!("expected object end, got {m:#04x}"), at)),
                };
            }
            let value = self.value()?;
            map.insert(key, value);
        }
    }

    /// Reserve a reference slot before decoding a complex value
    fn begin_ref(&mut self) -> (usize, usize) {
        self.refs.push((Value::Null, 1));
        (self.refs.len() - 1, self.spent)
    }

    fn end_ref(&mut self, (slot, start): (usize, usize), value: Value) -> Value {
        let weight = self.spent - start + 1;
        if let Some(r) = self.refs.get_mut(slot) {
            *r = (value.clone(), weight);
        }
        value
    }

    fn value(&mut self) -> Result<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::amf_at("nesting too deep", self.pos));
        }
        self.depth += 1;
        let value = self.value_inner();
        self.depth -= 1;
        value
    }

    fn value_inner(&mut self) -> Result<Value> {
        let at = self.pos;
        self.charge(1)?;
        match self.u8()? {
            marker::NUMBER => Ok(Self::number(self.f64()?)),
            marker::BOOLEAN => Ok(Value::Bool(self.u8()? != 0)),
            marker::STRING => Ok(Value::String(self.short_string()?)),
            marker::LONG_STRING | marker::XML_DOCUMENT => Ok(Value::String(self.long_string()?)),
            marker::NULL | marker::UNDEFINED | marker::UNSUPPORTED => Ok(Value::Null),
            marker::OBJECT => {
                let slot = self.begin_ref();
                let mut map = Map::new();
                self.properties(&mut map)?;
                Ok(self.end_ref(slot, Value::Object(map)))
            }
            marker::TYPED_OBJECT => {
                let slot = self.begin_ref();
                let class = self.short_string()?;
                let mut map = Map::new();
                self.properties(&mut map)?;
                map.insert("__class__".to_string(), Value::String(class));
                Ok(self.end_ref(slot, Value::Object(map)))
            }
            marker::ECMA_ARRAY => {
                let slot = self.begin_ref();
                let _count = self.u32()?;
                let mut map = Map::new();
                self.properties(&mut map)?;
                Ok(self.end_ref(slot, Value::Object(map)))
            }
            marker::STRICT_ARRAY => {
                let slot = self.begin_ref();
                let count = self.u32()? as usize;
                // every element takes at least one byte
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.value()?);
                }
                Ok(self.end_ref(slot, Value::Array(items)))
            }
            marker::DATE => {
                let millis = self.f64()?;
                let _tz = self.u16()?;
                Ok(Self::number(millis))
            }
            marker::REFERENCE => {
                let index = self.u16()? as usize;
                let weight = self
                    .refs
                    .get(index)
                    .map(|(_, weight)| *weight)
                    .ok_or_else(|| Error::amf_at(format!("bad reference {index}"), at))?;
                // charged before cloning so expansion stops at the budget
                self.charge(weight)?;
                Ok(self.refs[index].0.clone())
            }
            marker::AVMPLUS => Err(Error::amf_at("AMF3 payloads are not supported", at)),
            m => Err(Error::amf_at(format!("unknown type marker {m:#04x}"), at)),
        }
    }

    /// One top-level value with a fresh reference table
    fn root_value(&mut self) -> Result<Value> {
        self.refs.clear();
        self.value()
    }
}

/// Decode a remoting envelope; the whole buffer must be consumed
pub(crate) fn decode_envelope(content: &[u8]) -> Result<Envelope> {
    let mut r = Reader::new(content);

    let version = r.u16()?;
    if version != 0 && version != 3 {
        return Err(Error::amf_at(format!("unknown envelope version {version}"), 0));
    }

    let header_count = r.u16()?;
    let mut headers = Vec::new();
    for _ in 0..header_count {
        let name = r.short_string()?;
        let must_understand = r.u8()? != 0;
        let _len = r.u32()?;
        headers.push((name, must_understand, r.root_value()?));
    }

    let message_count = r.u16()?;
    let mut messages = Vec::new();
    for _ in 0..message_count {
        let target = r.short_string()?;
        let response = r.short_string()?;
        let _len = r.u32()?;
        let body = r.root_value()?;

        let reply = RESPONSE_SUFFIXES
            .iter()
            .find_map(|(suffix, status)| target.strip_suffix(suffix).map(|k| (k, *status)));
        messages.push(match reply {
            Some((key, status)) => Message::Response {
                key: key.to_string(),
                status,
                body,
            },
            None => Message::Request {
                key: response,
                target,
                body,
            },
        });
    }

    if r.remaining() > 0 {
        return Err(Error::amf_at("trailing data after envelope", r.pos));
    }

    Ok(Envelope {
        version,
        headers,
        messages,
    })
}

pub(super) fn render(content: &[u8], limit: usize) -> Result<Option<Rendered>> {
    let envelope = match decode_envelope(content) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!("Not an AMF envelope: {e}");
            return Ok(None);
        }
    };
    debug!(
        version = envelope.version,
        headers = envelope.headers.len(),
        messages = envelope.messages.len(),
        "Decoded AMF envelope"
    );
    let s = envelope.to_json()?;
    Ok(Some(Rendered::new(
        "AMF",
        render_text(truncate(s.as_bytes(), limit), s.len(), limit),
    )))
}
