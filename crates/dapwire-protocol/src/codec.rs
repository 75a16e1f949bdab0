use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ProtocolError, Result};
use crate::events::Event;
use crate::message::{Message, MessageKind, ProtocolMessage};
use crate::registry::{MessageRegistry, Variant};
use crate::requests::Request;
use crate::responses::{RequestResult, Response, ResponseBody};

/// Maps JSON envelopes to typed messages and back through a registry.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<MessageRegistry>,
}

impl Codec {
    /// Codec owning `registry`.
    pub fn new(registry: MessageRegistry) -> Self {
        Self::with_shared(Arc::new(registry))
    }

    /// Codec sharing an existing registry.
    pub fn with_shared(registry: Arc<MessageRegistry>) -> Self {
        Self { registry }
    }

    /// Codec over the built-in catalog.
    pub fn standard() -> Self {
        Self::new(MessageRegistry::standard())
    }

    /// The registry this codec resolves tags against.
    pub fn registry(&self) -> &Arc<MessageRegistry> {
        &self.registry
    }

    /// Decode a message body from text.
    pub fn decode_str(&self, body: &str) -> Result<ProtocolMessage> {
        let value: Value = serde_json::from_str(body)?;
        self.decode_value(&value)
    }

    /// Decode a message body from raw bytes.
    pub fn decode_slice(&self, body: &[u8]) -> Result<ProtocolMessage> {
        let value: Value = serde_json::from_slice(body)?;
        self.decode_value(&value)
    }

    /// Decode a parsed envelope.
    pub fn decode_value(&self, value: &Value) -> Result<ProtocolMessage> {
        let envelope = value
            .as_object()
            .ok_or_else(|| ProtocolError::MalformedEnvelope("message is not a JSON object".into()))?;

        let seq = envelope
            .get("seq")
            .and_then(Value::as_i64)
            .ok_or_else(|| ProtocolError::MalformedEnvelope("missing integer `seq`".into()))?;
        let kind = envelope
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::MalformedEnvelope("missing string `type`".into()))?;
        let kind = MessageKind::parse(kind)
            .ok_or_else(|| ProtocolError::UnsupportedMessageType(kind.to_string()))?;

        let message = match kind {
            MessageKind::Request => Message::Request(self.decode_variant::<Request>(envelope)?),
            MessageKind::Response => {
                let body = self.decode_variant::<ResponseBody>(envelope)?;
                let result = RequestResult::deserialize(value).map_err(|err| {
                    ProtocolError::MalformedEnvelope(format!("invalid response result: {err}"))
                })?;
                Message::Response(Response { result, body })
            }
            MessageKind::Event => Message::Event(self.decode_variant::<Event>(envelope)?),
        };

        trace!(seq, kind = %kind, tag = message.tag(), "decoded message");
        Ok(ProtocolMessage { seq, message })
    }

    fn decode_variant<T: Variant>(&self, envelope: &Map<String, Value>) -> Result<T> {
        let tag_key = T::KIND.tag_key();
        let tag = envelope.get(tag_key).and_then(Value::as_str).ok_or_else(|| {
            ProtocolError::MalformedEnvelope(format!("{} is missing string `{tag_key}`", T::KIND))
        })?;

        let handler = self
            .registry
            .resolve::<T>(tag)
            .ok_or_else(|| ProtocolError::UnsupportedTag {
                kind: T::KIND,
                tag: tag.to_string(),
            })?;

        let payload = envelope
            .get(T::KIND.payload_key())
            .filter(|payload| !payload.is_null());
        handler
            .decode(payload)
            .map_err(|source| ProtocolError::MalformedPayload {
                tag: tag.to_string(),
                source,
            })
    }

    /// Encode a message into its JSON envelope.
    pub fn encode_value(&self, message: &ProtocolMessage) -> Result<Value> {
        let mut envelope = Map::new();
        envelope.insert("seq".into(), Value::from(message.seq));
        envelope.insert("type".into(), Value::from(message.kind().as_str()));

        match &message.message {
            Message::Request(request) => self.encode_variant(request, &mut envelope)?,
            Message::Response(response) => {
                self.encode_variant(&response.body, &mut envelope)?;
                let result = serde_json::to_value(&response.result)
                    .map_err(|err| ProtocolError::Encoding(err.to_string()))?;
                if let Value::Object(fields) = result {
                    envelope.extend(fields);
                }
            }
            Message::Event(event) => self.encode_variant(event, &mut envelope)?,
        }

        Ok(Value::Object(envelope))
    }

    fn encode_variant<T: Variant>(&self, message: &T, envelope: &mut Map<String, Value>) -> Result<()> {
        let tag = message.tag();
        let handler = self
            .registry
            .resolve::<T>(tag)
            .ok_or_else(|| ProtocolError::UnsupportedTag {
                kind: T::KIND,
                tag: tag.to_string(),
            })?;

        envelope.insert(T::KIND.tag_key().into(), Value::from(tag));
        let payload = handler
            .encode(message)
            .map_err(|err| ProtocolError::Encoding(format!("{} {tag:?}: {err}", T::KIND)))?;
        if let Some(payload) = payload {
            envelope.insert(T::KIND.payload_key().into(), payload);
        }
        Ok(())
    }

    /// Encode a message into body bytes ready for framing.
    pub fn encode_vec(&self, message: &ProtocolMessage) -> Result<Vec<u8>> {
        let value = self.encode_value(message)?;
        serde_json::to_vec(&value).map_err(|err| ProtocolError::Encoding(err.to_string()))
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::standard()
    }
}
