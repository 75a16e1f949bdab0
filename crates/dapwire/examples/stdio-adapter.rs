//! Mock debug adapter speaking the protocol over stdin/stdout.
//!
//! It reports capabilities, pretends to launch whatever `program` the
//! front-end names, stops once on entry, and exits on `disconnect`.
//!
//! Run with:
//!   cargo run --example stdio-adapter
//!
//! Then point an editor's debug configuration at the built binary, or feed
//! it a capture:
//!   cargo run --features cli -- frame requests.ndjson \
//!     | cargo run --example stdio-adapter \
//!     | cargo run --features cli -- decode --format pretty

use dapwire::adapter::{DebugAdapter, MessageSender};
use dapwire::protocol::events::{OutputEvent, StopReason, StoppedEvent};
use dapwire::protocol::responses::{Capabilities, ThreadsResponse};
use dapwire::protocol::types::Thread;
use dapwire::protocol::{
    Event, Message, MessageRegistry, ProtocolMessage, Request, RequestResult, Response,
    ResponseBody,
};

const MAIN_THREAD: i64 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut adapter = DebugAdapter::stdio(MessageRegistry::standard());
    let sender = adapter.sender();

    let stats = adapter.run(move |message: ProtocolMessage| {
        let Message::Request(request) = message.message else {
            return;
        };
        if let Err(err) = respond(&sender, message.seq, request) {
            eprintln!("reply failed: {err}");
        }
    })?;

    eprintln!(
        "input closed after {} frames ({} rejected)",
        stats.frames, stats.rejected
    );
    Ok(())
}

fn respond(
    sender: &MessageSender,
    request_seq: i64,
    request: Request,
) -> dapwire::adapter::Result<()> {
    let ok = RequestResult::success(request_seq);
    match request {
        Request::Initialize(_) => {
            let capabilities = Capabilities {
                supports_configuration_done_request: Some(true),
                ..Capabilities::default()
            };
            sender.send_message(Response::new(ok, ResponseBody::Initialize(capabilities)))?;
            sender.send_message(Event::Initialized)?;
        }
        Request::Launch(args) => {
            let program = args
                .extra
                .get("program")
                .and_then(|value| value.as_str())
                .unwrap_or("<unnamed>")
                .to_string();
            sender.send_message(Response::new(ok, ResponseBody::Launch))?;
            sender.send_message(Event::Output(OutputEvent::new(
                "console",
                format!("launching {program}\n"),
            )))?;
        }
        Request::ConfigurationDone => {
            sender.send_message(Response::new(ok, ResponseBody::ConfigurationDone))?;
            let mut stopped = StoppedEvent::new(StopReason::Entry);
            stopped.thread_id = Some(MAIN_THREAD);
            sender.send_message(Event::Stopped(stopped))?;
        }
        Request::Threads => {
            let threads = ThreadsResponse {
                threads: vec![Thread {
                    id: MAIN_THREAD,
                    name: "main".to_string(),
                }],
            };
            sender.send_message(Response::new(ok, ResponseBody::Threads(threads)))?;
        }
        Request::Disconnect(_) => {
            sender.send_message(Response::new(ok, ResponseBody::Disconnect))?;
            sender.send_message(Event::Terminated(None))?;
        }
        other => {
            let command = other.command().to_string();
            let result = RequestResult::failure(request_seq, format!("{command} is not supported"));
            sender.send_message(Response::new(result, ResponseBody::Error))?;
        }
    }
    Ok(())
}
