//! Tool execution engine.
//!
//! The `ToolExecutor` compiles a tool's code into a JavaScript function of
//! one argument, `input`, and calls it once. Every failure on the way,
//! whether a syntax error, a thrown value or an engine fault, comes back as
//! diagnostic text. `execute` never returns an error to its caller.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use boa_engine::error::JsNativeErrorKind;
use boa_engine::{Context, JsError, JsString, JsValue, js_string};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ExecutorConfig;
use crate::tool::Tool;

/// Prefix of every diagnostic result.
pub const DIAGNOSTIC_PREFIX: &str = "Error executing tool: ";

/// Result of running a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the tool returned normally.
    pub success: bool,

    /// The tool's output, or the diagnostic text on failure.
    pub output: String,

    /// Failure message, without the diagnostic prefix.
    pub error: Option<String>,

    /// Execution time in milliseconds.
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Create a successful result.
    pub fn success(output: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
            duration_ms,
        }
    }

    /// Create a failed result carrying a diagnostic output.
    pub fn failure(message: impl Into<String>, duration_ms: u64) -> Self {
        let message = message.into();
        Self {
            success: false,
            output: format!("{DIAGNOSTIC_PREFIX}{message}"),
            error: Some(message),
            duration_ms,
        }
    }

    /// The text shown to the user.
    pub fn into_output(self) -> String {
        self.output
    }
}

/// Executor for running tools.
///
/// Each call gets a fresh JavaScript context, so nothing leaks from one
/// invocation to the next.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    config: ExecutorConfig,
}

impl ToolExecutor {
    /// Create an executor with no runtime limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor with the given limits.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Run `tool` against `input`.
    pub fn execute(&self, tool: &Tool, input: &str) -> ExecutionResult {
        let start = Instant::now();
        debug!("Executing tool: {} ({} bytes of input)", tool.id, input.len());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(&tool.code, input)))
            .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));

        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                debug!("Tool {} finished in {duration_ms}ms", tool.id);
                ExecutionResult::success(output, duration_ms)
            }
            Err(message) => {
                warn!("Tool {} failed: {message}", tool.id);
                ExecutionResult::failure(message, duration_ms)
            }
        }
    }

    fn run(&self, code: &str, input: &str) -> Result<String, String> {
        let mut context = Context::default();
        self.apply_limits(&mut context);

        self.call(&mut context, code, input)
            .map_err(|e| describe_error(&e, &mut context))
    }

    fn call(&self, context: &mut Context, code: &str, input: &str) -> Result<String, JsError> {
        // Same as `new Function('input', code)`: the code is parsed as a
        // function body on its own, so it cannot close the function early.
        let global = context.global_object();
        let constructor = global.get(js_string!("Function"), context)?;
        let constructor = constructor.as_constructor().ok_or_else(|| {
            JsError::from_opaque(JsValue::from(js_string!(
                "Function constructor is unavailable"
            )))
        })?;

        let function = constructor.construct(
            &[
                JsValue::from(js_string!("input")),
                JsValue::from(JsString::from(code)),
            ],
            None,
            context,
        )?;

        let result = function.call(
            &JsValue::undefined(),
            &[JsValue::from(JsString::from(input))],
            context,
        )?;

        Ok(result.to_string(context)?.to_std_string_lossy())
    }

    fn apply_limits(&self, context: &mut Context) {
        let limits = context.runtime_limits_mut();
        if let Some(limit) = self.config.loop_iteration_limit {
            limits.set_loop_iteration_limit(limit);
        }
        if let Some(limit) = self.config.recursion_limit {
            limits.set_recursion_limit(limit);
        }
    }
}

/// Turn a JavaScript failure into its human-readable message.
///
/// Errors are read through their `message` property whether the script threw
/// them or the engine raised them. Other thrown values use their string form.
fn describe_error(err: &JsError, context: &mut Context) -> String {
    // Runtime limit errors have no script-visible form.
    if let Some(native) = err.as_native() {
        if matches!(native.kind, JsNativeErrorKind::RuntimeLimit) {
            return err.to_string();
        }
    }

    let value = err.to_opaque(context);
    if let Some(object) = value.as_object() {
        if let Ok(message) = object.get(js_string!("message"), context) {
            if !message.is_undefined() {
                if let Ok(text) = message.to_string(context) {
                    return text.to_std_string_lossy();
                }
            }
        }
    }
    match value.to_string(context) {
        Ok(text) => text.to_std_string_lossy(),
        Err(_) => err.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "engine panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tool(code: &str) -> Tool {
        Tool::new_custom().with_name("test").with_code(code)
    }

    fn run(code: &str, input: &str) -> String {
        ToolExecutor::new().execute(&tool(code), input).into_output()
    }

    #[test]
    fn test_identity_tool() {
        let result = ToolExecutor::new().execute(&Tool::new_custom(), "hello");
        assert!(result.success);
        assert_eq!(result.output, "hello");
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_thrown_error_becomes_diagnostic() {
        let result = ToolExecutor::new().execute(&tool("throw new Error('x')"), "");
        assert!(!result.success);
        assert_eq!(result.output, "Error executing tool: x");
        assert_eq!(result.error.as_deref(), Some("x"));
    }

    #[test]
    fn test_thrown_string_becomes_diagnostic() {
        assert_eq!(run("throw 'boom';", ""), "Error executing tool: boom");
    }

    #[test]
    fn test_syntax_error_becomes_diagnostic() {
        let output = run("return input.split(;", "a");
        assert!(output.starts_with(DIAGNOSTIC_PREFIX), "got {output}");
    }

    #[test]
    fn test_runtime_type_error_becomes_diagnostic() {
        let output = run("return input.noSuchMethod();", "a");
        assert!(output.starts_with(DIAGNOSTIC_PREFIX), "got {output}");
        assert!(!output.contains("TypeError"), "got {output}");
    }

    #[test]
    fn test_engine_errors_report_message_only() {
        let result = ToolExecutor::new().execute(&tool("return JSON.parse(input);"), "{oops");
        let message = result.error.unwrap();
        assert!(!message.is_empty());
        assert!(!message.starts_with("SyntaxError"), "got {message}");

        assert_eq!(run("throw new TypeError('x');", ""), "Error executing tool: x");
    }

    #[test]
    fn test_code_cannot_close_the_function_body() {
        let output = run("return 1; }); (function (input) { return 'escaped';", "");
        assert!(output.starts_with(DIAGNOSTIC_PREFIX), "got {output}");
        assert_ne!(output, "escaped");
    }

    #[test]
    fn test_lone_surrogate_output_is_replaced() {
        assert_eq!(run("return input.slice(0, 1);", "\u{1F600}"), "\u{FFFD}");
    }

    #[test]
    fn test_return_value_is_coerced() {
        assert_eq!(run("return input.length;", "abcd"), "4");
        assert_eq!(run("return [1, 2];", ""), "1,2");
        assert_eq!(run("", "ignored"), "undefined");
    }

    #[test]
    fn test_no_state_between_runs() {
        let executor = ToolExecutor::new();
        let counter = tool("globalThis.n = (globalThis.n || 0) + 1; return String(globalThis.n);");

        assert_eq!(executor.execute(&counter, "").output, "1");
        assert_eq!(executor.execute(&counter, "").output, "1");
    }

    #[test]
    fn test_trailing_line_comment() {
        assert_eq!(run("return input; // done", "ok"), "ok");
    }

    #[test]
    fn test_loop_limit_stops_runaway_tool() {
        let executor = ToolExecutor::with_config(ExecutorConfig {
            loop_iteration_limit: Some(1_000),
            recursion_limit: None,
        });

        let result = executor.execute(&tool("while (true) {}"), "");
        assert!(!result.success);
        assert!(result.output.starts_with(DIAGNOSTIC_PREFIX));
    }
}
