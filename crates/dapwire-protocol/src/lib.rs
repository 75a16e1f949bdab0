//! Typed debug adapter protocol messages and their JSON codec.
//!
//! Every body on the wire is an envelope `{"seq", "type", ...}` whose
//! `command` or `event` tag selects a concrete variant. The
//! [`MessageRegistry`] maps each tag to a decode/encode handler, and the
//! [`Codec`] drives it in both directions. Payload fields with no fixed
//! schema survive as [`DynamicValue`] trees.
//!
//! ```
//! use dapwire_protocol::{Codec, Event, Message};
//!
//! let codec = Codec::standard();
//! let message = codec
//!     .decode_str(r#"{"seq":1,"type":"event","event":"initialized"}"#)
//!     .unwrap();
//! assert_eq!(message.message, Message::Event(Event::Initialized));
//! ```

pub mod codec;
pub mod error;
pub mod events;
pub mod extensible;
pub mod message;
pub mod registry;
pub mod requests;
pub mod responses;
pub mod types;
pub mod value;

pub use codec::Codec;
pub use error::{PayloadError, ProtocolError, Result};
pub use events::Event;
pub use extensible::{Extensible, FixedFields};
pub use message::{Message, MessageKind, ProtocolMessage};
pub use registry::{MessageRegistry, Variant, VariantHandler};
pub use requests::Request;
pub use responses::{RequestResult, Response, ResponseBody};
pub use value::DynamicValue;
