//! Response commands, the shared result fields, and response bodies.

use serde::{Deserialize, Serialize};

use crate::types::{
    Breakpoint, ChecksumAlgorithm, ColumnDescriptor, ExceptionBreakpointsFilter, Scope,
    StackFrame, Thread, Variable,
};
use crate::value::DynamicValue;

/// Fields every response carries inline next to `command`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestResult {
    pub request_seq: i64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RequestResult {
    pub fn success(request_seq: i64) -> Self {
        Self {
            request_seq,
            success: true,
            message: None,
        }
    }

    pub fn failure(request_seq: i64, message: impl Into<String>) -> Self {
        Self {
            request_seq,
            success: false,
            message: Some(message.into()),
        }
    }
}

/// A response: the shared result plus the command-specific body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub result: RequestResult,
    pub body: ResponseBody,
}

impl Response {
    pub fn new(result: RequestResult, body: ResponseBody) -> Self {
        Self { result, body }
    }

    /// An `error` response not tied to any request (`request_seq` 0).
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(RequestResult::failure(0, message), ResponseBody::Error)
    }

    pub fn command(&self) -> &str {
        self.body.command()
    }
}

/// Command-specific part of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Goto,
    Next,
    StepIn,
    StepOut,
    Continue(ContinueResponse),
    Error,
    Initialize(Capabilities),
    Launch,
    Attach,
    Pause,
    SetBreakpoints(SetBreakpointsResponse),
    SetFunctionBreakpoints(SetBreakpointsResponse),
    SetExceptionBreakpoints,
    SetDataBreakpoints(SetBreakpointsResponse),
    ConfigurationDone,
    Threads(ThreadsResponse),
    Scopes(ScopesResponse),
    Variables(VariablesResponse),
    StackTrace(StackTraceResponse),
    Disconnect,
    /// A command registered by the application, carried untyped.
    Custom {
        command: String,
        body: Option<DynamicValue>,
    },
}

impl ResponseBody {
    pub fn command(&self) -> &str {
        match self {
            ResponseBody::Goto => "goto",
            ResponseBody::Next => "next",
            ResponseBody::StepIn => "stepIn",
            ResponseBody::StepOut => "stepOut",
            ResponseBody::Continue(_) => "continue",
            ResponseBody::Error => "error",
            ResponseBody::Initialize(_) => "initialize",
            ResponseBody::Launch => "launch",
            ResponseBody::Attach => "attach",
            ResponseBody::Pause => "pause",
            ResponseBody::SetBreakpoints(_) => "setBreakpoints",
            ResponseBody::SetFunctionBreakpoints(_) => "setFunctionBreakpoints",
            ResponseBody::SetExceptionBreakpoints => "setExceptionBreakpoints",
            ResponseBody::SetDataBreakpoints(_) => "setDataBreakpoints",
            ResponseBody::ConfigurationDone => "configurationDone",
            ResponseBody::Threads(_) => "threads",
            ResponseBody::Scopes(_) => "scopes",
            ResponseBody::Variables(_) => "variables",
            ResponseBody::StackTrace(_) => "stackTrace",
            ResponseBody::Disconnect => "disconnect",
            ResponseBody::Custom { command, .. } => command,
        }
    }
}

/// Adapter feature flags returned from `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_configuration_done_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_function_breakpoints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_conditional_breakpoints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_hit_conditional_breakpoints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_evaluate_for_hovers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_breakpoint_filters: Option<Vec<ExceptionBreakpointsFilter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_step_back: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_set_variable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_restart_frame: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_goto_targets_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_step_in_targets_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_completions_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_trigger_characters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_modules_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_module_columns: Option<Vec<ColumnDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_checksum_algorithms: Option<Vec<ChecksumAlgorithm>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_restart_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_exception_options: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_value_formatting_options: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_exception_info_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_terminate_debuggee: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_delayed_stack_trace_loading: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_loaded_sources_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_log_points: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_terminate_threads_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_set_expression: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_terminate_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_data_breakpoints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_read_memory_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_disassemble_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_cancel_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_breakpoint_locations_request: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_clipboard_context: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_threads_continued: Option<bool>,
}

/// Body of `setBreakpoints`, `setFunctionBreakpoints` and `setDataBreakpoints`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetBreakpointsResponse {
    pub breakpoints: Vec<Breakpoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadsResponse {
    pub threads: Vec<Thread>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceResponse {
    pub stack_frames: Vec<StackFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopesResponse {
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariablesResponse {
    pub variables: Vec<Variable>,
}
