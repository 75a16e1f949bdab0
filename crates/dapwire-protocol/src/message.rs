use std::fmt;

use crate::events::Event;
use crate::requests::Request;
use crate::responses::Response;

/// The three envelope `type`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Request,
    Response,
    Event,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [MessageKind::Request, MessageKind::Response, MessageKind::Event];

    /// The envelope `type` value.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Request => "request",
            MessageKind::Response => "response",
            MessageKind::Event => "event",
        }
    }

    /// Parse an envelope `type` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "request" => Some(MessageKind::Request),
            "response" => Some(MessageKind::Response),
            "event" => Some(MessageKind::Event),
            _ => None,
        }
    }

    /// Envelope key holding the tag for this kind.
    pub fn tag_key(self) -> &'static str {
        match self {
            MessageKind::Request | MessageKind::Response => "command",
            MessageKind::Event => "event",
        }
    }

    /// Envelope key holding the payload for this kind.
    pub fn payload_key(self) -> &'static str {
        match self {
            MessageKind::Request => "arguments",
            MessageKind::Response | MessageKind::Event => "body",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed message without its sequence number.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Response(Response),
    Event(Event),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Request(_) => MessageKind::Request,
            Message::Response(_) => MessageKind::Response,
            Message::Event(_) => MessageKind::Event,
        }
    }

    /// The `command` or `event` name.
    pub fn tag(&self) -> &str {
        match self {
            Message::Request(request) => request.command(),
            Message::Response(response) => response.command(),
            Message::Event(event) => event.name(),
        }
    }
}

impl From<Request> for Message {
    fn from(value: Request) -> Self {
        Message::Request(value)
    }
}

impl From<Response> for Message {
    fn from(value: Response) -> Self {
        Message::Response(value)
    }
}

impl From<Event> for Message {
    fn from(value: Event) -> Self {
        Message::Event(value)
    }
}

/// A message together with the sender-assigned `seq`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolMessage {
    pub seq: i64,
    pub message: Message,
}

impl ProtocolMessage {
    pub fn new(seq: i64, message: impl Into<Message>) -> Self {
        Self {
            seq,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.message.kind()
    }

    pub fn tag(&self) -> &str {
        self.message.tag()
    }
}
