// End-to-end conversations against the public API.
//
// A scripted backend replays canned completions so each conversation is
// deterministic; tools are the shipped built-ins plus a few local fakes.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use toolguard_core::GuardConfig;
use toolguard_core::agent::{Agent, AgentOptions, Normalizer, RawCall, TerminationReason};
use toolguard_core::config::{ToolConfig, UnknownToolReply};
use toolguard_core::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use toolguard_core::tooling::builtin::{BUILTIN_TOOLS, registry_from_config};
use toolguard_core::tooling::{ParamSpec, ToolInvokeError, ToolRegistry, ToolSpec};

// ============================================================================
// Test Backend
// ============================================================================

struct ScriptedBackend {
    script: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(script: &[&str]) -> Self {
        Self {
            script: Mutex::new(script.iter().map(|line| line.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedBackend {
    async fn chat(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("script");
        if script.is_empty() {
            return Err(ModelError::invalid_response("scripted", "script exhausted"));
        }
        Ok(ModelResponse::new(script.remove(0)))
    }
}

fn builtin_registry() -> Arc<ToolRegistry> {
    let tools: Vec<ToolConfig> = BUILTIN_TOOLS
        .iter()
        .map(|name| ToolConfig::named(*name))
        .collect();
    Arc::new(registry_from_config(&tools).expect("built-ins register"))
}

fn options(guard: GuardConfig) -> AgentOptions {
    AgentOptions::new("scripted-model").with_guard(guard)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn shorthand_multiply_is_normalized_and_dispatched() {
    let registry = builtin_registry();
    let normalizer = Normalizer::new(&registry, UnknownToolReply::Generic);
    let call = normalizer.normalize(RawCall::from_completion(r#"{"multiply": {"a":2,"b":3}}"#));
    assert_eq!(call.name, "multiply");
    assert_eq!(Value::Object(call.arguments.clone()), json!({"a": 2, "b": 3}));

    let backend = ScriptedBackend::new(&[
        r#"{"multiply": {"a":2,"b":3}}"#,
        r#"{"name": "final_answer", "arguments": {"response": "6"}}"#,
    ]);
    let agent = Agent::new(backend, registry.clone(), options(GuardConfig::default()));

    let outcome = agent.run("What is 2 times 3?").await.expect("run");

    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.steps[0].output, json!(6));
    assert_eq!(outcome.response, "6");
    assert_eq!(outcome.reason, TerminationReason::Answered);
}

#[tokio::test]
async fn third_call_to_the_same_tool_is_refused() {
    let backend = ScriptedBackend::new(&[
        r#"{"name": "multiply", "arguments": {"a": 1, "b": 2}}"#,
        r#"{"name": "multiply", "arguments": {"a": 3, "b": 4}}"#,
        r#"{"name": "multiply", "arguments": {"a": 5, "b": 6}}"#,
        r#"{"response": "never reached"}"#,
    ]);
    let agent = Agent::new(
        backend,
        builtin_registry(),
        options(
            GuardConfig::default()
                .with_max_tool_calls(2)
                .with_duplicate_suppression(false),
        ),
    );

    let outcome = agent.run("multiply a few things").await.expect("run");

    assert_eq!(outcome.steps.len(), 2);
    assert_eq!(outcome.response, "I don't know the answer.");
    assert_eq!(
        outcome.reason,
        TerminationReason::ToolCallBudget {
            tool: "multiply".into()
        }
    );
    assert_eq!(agent.provider().calls(), 3);
}

#[tokio::test]
async fn unregistered_tool_ends_the_conversation_under_either_policy() {
    for (reply, expected) in [
        (UnknownToolReply::Generic, "Unknown tool call format."),
        (UnknownToolReply::Named, "Tool 'frobnicate' does not exist."),
    ] {
        let backend = ScriptedBackend::new(&[
            r#"{"name": "frobnicate", "arguments": {"level": 11}}"#,
            r#"{"response": "never reached"}"#,
        ]);
        let agent = Agent::new(
            backend,
            builtin_registry(),
            options(GuardConfig::default().with_unknown_tool_reply(reply)),
        );

        let outcome = agent.run("frobnicate the widget").await.expect("run");

        assert_eq!(outcome.response, expected);
        assert!(outcome.steps.is_empty());
        assert_eq!(agent.provider().calls(), 1);
    }
}

#[tokio::test]
async fn third_consecutive_error_terminates_with_fallback() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = invocations.clone();
    let lookup = move |_: &Map<String, Value>| -> Result<Value, ToolInvokeError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(json!("Error: record does not exist"))
    };
    let mut registry = ToolRegistry::new();
    registry
        .register(ToolSpec::new("lookup", lookup).with_param(ParamSpec::required("key")))
        .expect("register");
    let backend = ScriptedBackend::new(&[
        r#"{"lookup": {"key": "alpha"}}"#,
        r#"{"lookup": {"key": "beta"}}"#,
        r#"{"lookup": {"key": "gamma"}}"#,
        r#"{"response": "never reached"}"#,
    ]);
    let agent = Agent::new(
        backend,
        Arc::new(registry),
        options(
            GuardConfig::default()
                .with_max_tool_calls(10)
                .with_error_threshold(2),
        ),
    );

    let outcome = agent.run("find the records").await.expect("run");

    assert_eq!(invocations.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.response, "I don't know the answer.");
    assert_eq!(
        outcome.reason,
        TerminationReason::ErrorStreak {
            tool: "lookup".into()
        }
    );
}

// ============================================================================
// Bounds
// ============================================================================

#[tokio::test]
async fn model_is_never_consulted_more_than_the_step_budget() {
    for max_steps in 1..=4 {
        let script: Vec<String> = (0..10)
            .map(|i| {
                format!(r#"{{"name": "calculator", "arguments": {{"expression": "{i} plus 1"}}}}"#)
            })
            .collect();
        let script: Vec<&str> = script.iter().map(String::as_str).collect();
        let agent = Agent::new(
            ScriptedBackend::new(&script),
            builtin_registry(),
            options(
                GuardConfig::default()
                    .with_max_steps(max_steps)
                    .with_max_tool_calls(100)
                    .with_duplicate_suppression(false),
            ),
        );

        let outcome = agent.run("keep counting").await.expect("run");

        assert_eq!(agent.provider().calls(), max_steps);
        assert_eq!(outcome.step_count, max_steps);
        assert_eq!(outcome.reason, TerminationReason::StepBudget);
        assert!(outcome.steps.iter().all(|step| step.success));
    }
}

#[tokio::test]
async fn custom_fallback_is_used_verbatim() {
    let agent = Agent::new(
        ScriptedBackend::new(&[r#"{"answer": "error: could not finish"}"#]),
        builtin_registry(),
        options(GuardConfig::default().with_fallback_answer("No answer available.")),
    );

    let outcome = agent.run("anything").await.expect("run");

    assert_eq!(outcome.response, "No answer available.");
    assert_eq!(outcome.reason, TerminationReason::VetoedAnswer);
}
