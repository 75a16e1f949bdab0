use dapwire_frame::FrameConfig;

/// Configuration for [`DebugAdapter`](crate::DebugAdapter).
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Limits applied to inbound and outbound frames.
    pub frame: FrameConfig,
    /// Answer undecodable messages with an `error` response.
    pub reply_to_decode_errors: bool,
    /// First `seq` handed out by [`MessageSender::send_message`](crate::MessageSender::send_message).
    pub first_seq: i64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            reply_to_decode_errors: true,
            first_seq: 1,
        }
    }
}
