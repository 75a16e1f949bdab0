//! Blocking debug adapter loop.
//!
//! [`DebugAdapter`] pulls framed bodies from an input stream, decodes them
//! with a [`Codec`](dapwire_protocol::Codec), and hands each message to a
//! [`MessageHandler`] in arrival order. Undecodable messages are answered
//! with an `error` response carrying `request_seq: 0` and the loop keeps
//! going. Replies are written through a [`MessageSender`], which serializes
//! whole frames so it can be shared between threads.
//!
//! ```no_run
//! use dapwire_adapter::DebugAdapter;
//! use dapwire_protocol::{Message, MessageRegistry, ProtocolMessage, Request};
//! use dapwire_protocol::responses::{Capabilities, RequestResult, Response, ResponseBody};
//!
//! let mut adapter = DebugAdapter::stdio(MessageRegistry::standard());
//! let sender = adapter.sender();
//! adapter
//!     .run(move |message: ProtocolMessage| {
//!         if let Message::Request(Request::Initialize(_)) = message.message {
//!             let reply = Response::new(
//!                 RequestResult::success(message.seq),
//!                 ResponseBody::Initialize(Capabilities::default()),
//!             );
//!             sender.send_message(reply).unwrap();
//!         }
//!     })
//!     .unwrap();
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod sender;

pub use adapter::{AdapterStats, DebugAdapter, MessageHandler};
pub use config::AdapterConfig;
pub use error::{AdapterError, Result};
pub use sender::MessageSender;
