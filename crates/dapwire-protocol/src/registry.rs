use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PayloadError;
use crate::events::Event;
use crate::message::MessageKind;
use crate::requests::Request;
use crate::responses::ResponseBody;
use crate::value::DynamicValue;

type DecodeFn<T> = dyn Fn(Option<&Value>) -> Result<T, PayloadError> + Send + Sync;
type EncodeFn<T> = dyn Fn(&T) -> Result<Option<Value>, PayloadError> + Send + Sync;

/// Decode and encode behavior for one tag.
///
/// `decode` receives the payload (`arguments` or `body`), with an absent key
/// and `null` both passed as `None`. `encode` returns the payload to write,
/// or `None` to omit the key.
pub struct VariantHandler<T> {
    decode: Box<DecodeFn<T>>,
    encode: Box<EncodeFn<T>>,
}

impl<T: 'static> VariantHandler<T> {
    /// Handler from raw payload decode and encode functions.
    pub fn new<D, E>(decode: D, encode: E) -> Self
    where
        D: Fn(Option<&Value>) -> Result<T, PayloadError> + Send + Sync + 'static,
        E: Fn(&T) -> Result<Option<Value>, PayloadError> + Send + Sync + 'static,
    {
        Self {
            decode: Box::new(decode),
            encode: Box::new(encode),
        }
    }

    /// A variant whose payload must be present.
    pub fn required<P, W, G>(wrap: W, project: G) -> Self
    where
        P: Serialize + DeserializeOwned + 'static,
        W: Fn(P) -> T + Send + Sync + 'static,
        G: Fn(&T) -> Option<&P> + Send + Sync + 'static,
    {
        Self::new(
            move |payload| {
                let payload = payload.ok_or(PayloadError::Missing)?;
                Ok(wrap(P::deserialize(payload)?))
            },
            move |message| {
                let payload = project(message).ok_or(PayloadError::VariantMismatch)?;
                Ok(Some(serde_json::to_value(payload)?))
            },
        )
    }

    /// A variant whose payload may be absent or `null`.
    pub fn optional<P, W, G>(wrap: W, project: G) -> Self
    where
        P: Serialize + DeserializeOwned + 'static,
        W: Fn(Option<P>) -> T + Send + Sync + 'static,
        G: Fn(&T) -> Option<Option<&P>> + Send + Sync + 'static,
    {
        Self::new(
            move |payload| {
                let payload = payload.map(P::deserialize).transpose()?;
                Ok(wrap(payload))
            },
            move |message| match project(message).ok_or(PayloadError::VariantMismatch)? {
                Some(payload) => Ok(Some(serde_json::to_value(payload)?)),
                None => Ok(None),
            },
        )
    }

    /// A variant without payload. Any payload on the wire is ignored.
    pub fn unit<M>(make: M) -> Self
    where
        M: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(move |_| Ok(make()), |_| Ok(None))
    }

    /// Build the variant from its wire payload.
    pub fn decode(&self, payload: Option<&Value>) -> Result<T, PayloadError> {
        (self.decode)(payload)
    }

    /// Payload to write for `message`, or `None` to omit it.
    pub fn encode(&self, message: &T) -> Result<Option<Value>, PayloadError> {
        (self.encode)(message)
    }
}

/// Untyped payload for application-defined tags.
fn dynamic_payload(payload: Option<&Value>) -> Option<DynamicValue> {
    payload.map(DynamicValue::from_json)
}

fn dynamic_json(payload: Option<&DynamicValue>) -> Result<Option<Value>, PayloadError> {
    payload
        .map(serde_json::to_value)
        .transpose()
        .map_err(PayloadError::from)
}

/// Message types that live in one of the registry's tag tables.
pub trait Variant: Sized + 'static {
    const KIND: MessageKind;

    fn tag(&self) -> &str;

    #[doc(hidden)]
    fn table(registry: &MessageRegistry) -> &HashMap<String, VariantHandler<Self>>;
}

impl Variant for Request {
    const KIND: MessageKind = MessageKind::Request;

    fn tag(&self) -> &str {
        self.command()
    }

    fn table(registry: &MessageRegistry) -> &HashMap<String, VariantHandler<Self>> {
        &registry.requests
    }
}

impl Variant for ResponseBody {
    const KIND: MessageKind = MessageKind::Response;

    fn tag(&self) -> &str {
        self.command()
    }

    fn table(registry: &MessageRegistry) -> &HashMap<String, VariantHandler<Self>> {
        &registry.responses
    }
}

impl Variant for Event {
    const KIND: MessageKind = MessageKind::Event;

    fn tag(&self) -> &str {
        self.name()
    }

    fn table(registry: &MessageRegistry) -> &HashMap<String, VariantHandler<Self>> {
        &registry.events
    }
}

/// Tag-keyed tables of variant handlers, one per message kind.
///
/// Build it once before decoding starts; share it read-only afterwards.
pub struct MessageRegistry {
    requests: HashMap<String, VariantHandler<Request>>,
    responses: HashMap<String, VariantHandler<ResponseBody>>,
    events: HashMap<String, VariantHandler<Event>>,
}

macro_rules! required {
    ($ty:ident :: $variant:ident) => {
        VariantHandler::required($ty::$variant, |message| match message {
            $ty::$variant(payload) => Some(payload),
            _ => None,
        })
    };
}

macro_rules! optional {
    ($ty:ident :: $variant:ident) => {
        VariantHandler::optional($ty::$variant, |message| match message {
            $ty::$variant(payload) => Some(payload.as_ref()),
            _ => None,
        })
    };
}

macro_rules! unit {
    ($ty:ident :: $variant:ident) => {
        VariantHandler::unit(|| $ty::$variant)
    };
}

impl MessageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            requests: HashMap::new(),
            responses: HashMap::new(),
            events: HashMap::new(),
        }
    }

    /// Registry holding the full built-in message catalog.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register_request("goto", optional!(Request::Goto));
        registry.register_request("next", optional!(Request::Next));
        registry.register_request("stepIn", required!(Request::StepIn));
        registry.register_request("stepOut", required!(Request::StepOut));
        registry.register_request("continue", required!(Request::Continue));
        registry.register_request("initialize", required!(Request::Initialize));
        registry.register_request("launch", required!(Request::Launch));
        registry.register_request("attach", required!(Request::Attach));
        registry.register_request("pause", required!(Request::Pause));
        registry.register_request("setBreakpoints", required!(Request::SetBreakpoints));
        registry.register_request(
            "setFunctionBreakpoints",
            required!(Request::SetFunctionBreakpoints),
        );
        registry.register_request(
            "setExceptionBreakpoints",
            required!(Request::SetExceptionBreakpoints),
        );
        registry.register_request("setDataBreakpoints", required!(Request::SetDataBreakpoints));
        registry.register_request("configurationDone", unit!(Request::ConfigurationDone));
        registry.register_request("threads", unit!(Request::Threads));
        registry.register_request("scopes", required!(Request::Scopes));
        registry.register_request("variables", required!(Request::Variables));
        registry.register_request("stackTrace", required!(Request::StackTrace));
        registry.register_request("disconnect", optional!(Request::Disconnect));

        registry.register_response("goto", unit!(ResponseBody::Goto));
        registry.register_response("next", unit!(ResponseBody::Next));
        registry.register_response("stepIn", unit!(ResponseBody::StepIn));
        registry.register_response("stepOut", unit!(ResponseBody::StepOut));
        registry.register_response("continue", required!(ResponseBody::Continue));
        registry.register_response("error", unit!(ResponseBody::Error));
        registry.register_response("initialize", required!(ResponseBody::Initialize));
        registry.register_response("launch", unit!(ResponseBody::Launch));
        registry.register_response("attach", unit!(ResponseBody::Attach));
        registry.register_response("pause", unit!(ResponseBody::Pause));
        registry.register_response("setBreakpoints", required!(ResponseBody::SetBreakpoints));
        registry.register_response(
            "setFunctionBreakpoints",
            required!(ResponseBody::SetFunctionBreakpoints),
        );
        registry.register_response(
            "setExceptionBreakpoints",
            unit!(ResponseBody::SetExceptionBreakpoints),
        );
        registry.register_response(
            "setDataBreakpoints",
            required!(ResponseBody::SetDataBreakpoints),
        );
        registry.register_response("configurationDone", unit!(ResponseBody::ConfigurationDone));
        registry.register_response("threads", required!(ResponseBody::Threads));
        registry.register_response("scopes", required!(ResponseBody::Scopes));
        registry.register_response("variables", required!(ResponseBody::Variables));
        registry.register_response("stackTrace", required!(ResponseBody::StackTrace));
        registry.register_response("disconnect", unit!(ResponseBody::Disconnect));

        registry.register_event("breakpoint", optional!(Event::Breakpoint));
        registry.register_event("initialized", unit!(Event::Initialized));
        registry.register_event("continued", required!(Event::Continued));
        registry.register_event("exited", required!(Event::Exited));
        registry.register_event("stopped", required!(Event::Stopped));
        registry.register_event("terminated", optional!(Event::Terminated));
        registry.register_event("output", required!(Event::Output));
        registry.register_event("thread", required!(Event::Thread));

        registry
    }

    /// Register or replace the handler for a request command.
    pub fn register_request(&mut self, command: impl Into<String>, handler: VariantHandler<Request>) {
        self.requests.insert(command.into(), handler);
    }

    /// Register or replace the handler for a response command.
    pub fn register_response(
        &mut self,
        command: impl Into<String>,
        handler: VariantHandler<ResponseBody>,
    ) {
        self.responses.insert(command.into(), handler);
    }

    /// Register or replace the handler for an event name.
    pub fn register_event(&mut self, event: impl Into<String>, handler: VariantHandler<Event>) {
        self.events.insert(event.into(), handler);
    }

    /// Accept `command` as a request carried as [`Request::Custom`].
    pub fn register_custom_request(&mut self, command: impl Into<String>) {
        let command = command.into();
        let tag = command.clone();
        self.register_request(
            command,
            VariantHandler::new(
                move |payload| {
                    Ok(Request::Custom {
                        command: tag.clone(),
                        arguments: dynamic_payload(payload),
                    })
                },
                |message| match message {
                    Request::Custom { arguments, .. } => dynamic_json(arguments.as_ref()),
                    _ => Err(PayloadError::VariantMismatch),
                },
            ),
        );
    }

    /// Accept `command` as a response carried as [`ResponseBody::Custom`].
    pub fn register_custom_response(&mut self, command: impl Into<String>) {
        let command = command.into();
        let tag = command.clone();
        self.register_response(
            command,
            VariantHandler::new(
                move |payload| {
                    Ok(ResponseBody::Custom {
                        command: tag.clone(),
                        body: dynamic_payload(payload),
                    })
                },
                |message| match message {
                    ResponseBody::Custom { body, .. } => dynamic_json(body.as_ref()),
                    _ => Err(PayloadError::VariantMismatch),
                },
            ),
        );
    }

    /// Accept `event` as an event carried as [`Event::Custom`].
    pub fn register_custom_event(&mut self, event: impl Into<String>) {
        let event = event.into();
        let tag = event.clone();
        self.register_event(
            event,
            VariantHandler::new(
                move |payload| {
                    Ok(Event::Custom {
                        event: tag.clone(),
                        body: dynamic_payload(payload),
                    })
                },
                |message| match message {
                    Event::Custom { body, .. } => dynamic_json(body.as_ref()),
                    _ => Err(PayloadError::VariantMismatch),
                },
            ),
        );
    }

    /// Look up the handler for `tag` in the table for `T`.
    ///
    /// Matching is exact and case-sensitive.
    pub fn resolve<T: Variant>(&self, tag: &str) -> Option<&VariantHandler<T>> {
        T::table(self).get(tag)
    }

    /// Check if a tag is registered for a kind.
    pub fn contains(&self, kind: MessageKind, tag: &str) -> bool {
        match kind {
            MessageKind::Request => self.requests.contains_key(tag),
            MessageKind::Response => self.responses.contains_key(tag),
            MessageKind::Event => self.events.contains_key(tag),
        }
    }

    /// Get registered tags for a kind, sorted.
    pub fn tags(&self, kind: MessageKind) -> Vec<&str> {
        let mut tags: Vec<&str> = match kind {
            MessageKind::Request => self.requests.keys().map(String::as_str).collect(),
            MessageKind::Response => self.responses.keys().map(String::as_str).collect(),
            MessageKind::Event => self.events.keys().map(String::as_str).collect(),
        };
        tags.sort_unstable();
        tags
    }
}

impl Default for MessageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRegistry")
            .field("requests", &self.tags(MessageKind::Request))
            .field("responses", &self.tags(MessageKind::Response))
            .field("events", &self.tags(MessageKind::Event))
            .finish()
    }
}
