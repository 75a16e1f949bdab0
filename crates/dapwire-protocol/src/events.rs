//! Events and their `body` records.

use serde::{Deserialize, Serialize};

use crate::types::{Breakpoint, Source};
use crate::value::DynamicValue;

/// An event sent from the adapter without a preceding request.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Breakpoint(Option<BreakpointEvent>),
    Initialized,
    Continued(ContinuedEvent),
    Exited(ExitedEvent),
    Stopped(StoppedEvent),
    Terminated(Option<TerminatedEvent>),
    Output(OutputEvent),
    Thread(ThreadEvent),
    /// An event registered by the application, carried untyped.
    Custom {
        event: String,
        body: Option<DynamicValue>,
    },
}

impl Event {
    /// The `event` name this is sent under.
    pub fn name(&self) -> &str {
        match self {
            Event::Breakpoint(_) => "breakpoint",
            Event::Initialized => "initialized",
            Event::Continued(_) => "continued",
            Event::Exited(_) => "exited",
            Event::Stopped(_) => "stopped",
            Event::Terminated(_) => "terminated",
            Event::Output(_) => "output",
            Event::Thread(_) => "thread",
            Event::Custom { event, .. } => event,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakpointReason {
    Changed,
    New,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointEvent {
    pub reason: BreakpointReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<Breakpoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    Step,
    Breakpoint,
    Exception,
    Pause,
    Entry,
    Goto,
    #[serde(rename = "function breakpoint")]
    FunctionBreakpoint,
    #[serde(rename = "data breakpoint")]
    DataBreakpoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedEvent {
    pub reason: StopReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_focus_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_threads_stopped: Option<bool>,
}

impl StoppedEvent {
    pub fn new(reason: StopReason) -> Self {
        Self {
            reason,
            description: None,
            thread_id: None,
            preserve_focus_hint: None,
            text: None,
            all_threads_stopped: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuedEvent {
    pub thread_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_threads_continued: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitedEvent {
    pub exit_code: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminatedEvent {
    /// Opaque restart data echoed back by the front-end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<DynamicValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables_reference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DynamicValue>,
}

impl OutputEvent {
    pub fn new(category: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            output: output.into(),
            group: None,
            variables_reference: None,
            source: None,
            line: None,
            column: None,
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadEvent {
    /// `started` or `exited`; adapters may send other values.
    pub reason: String,
    pub thread_id: i64,
}
