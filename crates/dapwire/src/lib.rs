//! Debug adapter protocol plumbing.
//!
//! dapwire splits the wire into three layers, each usable on its own:
//!
//! - [`frame`]: `Content-Length` framing over any byte stream
//! - [`protocol`]: typed envelopes, the tag registry, and the JSON codec
//! - [`adapter`]: a blocking read-dispatch loop with a shared reply path
//!   (behind the `adapter` feature, on by default)

/// Re-export frame types.
pub mod frame {
    pub use dapwire_frame::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use dapwire_protocol::*;
}

/// Re-export adapter types (requires `adapter` feature).
#[cfg(feature = "adapter")]
pub mod adapter {
    pub use dapwire_adapter::*;
}
