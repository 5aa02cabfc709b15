use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::call::{RawCall, render_value};
use super::context::{ToolContext, compose_system_instructions};
use super::errors::AgentError;
use super::guard::{FinalAnswer, GuardDecision, GuardPolicy, GuardState, TerminationReason};
use super::models::{AgentOptions, AgentOutcome, AgentStep};
use super::normalizer::Normalizer;
use super::sanitizer::{SanitizedCall, sanitize};
use crate::model::{ModelProvider, ModelRequest};
use crate::tooling::{ToolRegistry, ToolSpec};
use crate::types::{ChatMessage, MessageRole};

/// Drives conversations between one model backend and a shared, read-only
/// tool registry. Every [`Agent::run`] owns a fresh [`GuardState`], so runs
/// may proceed concurrently on the same agent.
pub struct Agent<P: ModelProvider> {
    provider: P,
    registry: Arc<ToolRegistry>,
    policy: GuardPolicy,
    options: AgentOptions,
    system_prompt: String,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: P, registry: Arc<ToolRegistry>, options: AgentOptions) -> Self {
        let context = ToolContext::from_registry(&registry);
        let system_prompt = compose_system_instructions(&context, options.system_prompt.as_deref());
        Self {
            provider,
            registry,
            policy: GuardPolicy::new(options.guard.clone()),
            options,
            system_prompt,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Runs one conversation to its single final answer.
    ///
    /// Malformed calls, tool failures, exhausted budgets and backend errors
    /// all end in a final answer. Only a registry inconsistency is an error.
    pub async fn run(&self, task: impl Into<String>) -> Result<AgentOutcome, AgentError> {
        let conversation_id = Uuid::new_v4().to_string();
        info!(conversation_id = %conversation_id, "Agent run started");

        let normalizer = Normalizer::new(&self.registry, self.policy.config().unknown_tool_reply);
        let mut state = GuardState::new();
        let mut steps = Vec::new();
        let mut messages = vec![
            ChatMessage::new(MessageRole::System, self.system_prompt.clone()),
            ChatMessage::new(MessageRole::User, task.into()),
        ];
        let tools = if self.options.native_tools {
            self.registry.descriptors()
        } else {
            Vec::new()
        };

        let answer: FinalAnswer = loop {
            if let GuardDecision::Terminate(answer) = self.policy.begin_step(&mut state) {
                break answer;
            }
            debug!(
                conversation_id = %conversation_id,
                step = state.step_count(),
                "Submitting agent turn to model provider"
            );

            let request = ModelRequest {
                model: self.options.model.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
            };
            let response = match self.provider.chat(request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(
                        conversation_id = %conversation_id,
                        error = %err,
                        "Model unavailable: {}",
                        err.user_message()
                    );
                    break self
                        .policy
                        .terminate(&mut state, TerminationReason::ModelUnavailable);
                }
            };
            messages.push(ChatMessage::new(MessageRole::Assistant, response.transcript()));

            let call = normalizer.normalize(RawCall::from_response(&response));
            if call.is_final_answer() {
                break self.policy.accept_final(&mut state, call.answer_text());
            }

            let spec = self
                .registry
                .lookup(&call.name)
                .map_err(|source| AgentError::Invariant {
                    tool: call.name.clone(),
                    source,
                })?;
            let sanitized = sanitize(call, spec);

            if let GuardDecision::Terminate(answer) =
                self.policy.admit(&mut state, &sanitized.call)
            {
                break answer;
            }

            let output = dispatch(spec, &sanitized).await;
            let content = render_value(&output);
            let success = !self.policy.config().is_error_shaped(&content);
            info!(tool = %sanitized.call.name, success, "Tool executed");

            messages.push(ChatMessage::tool_result(sanitized.call.name.clone(), content.clone()));
            let decision = self
                .policy
                .record_result(&mut state, &sanitized.call.name, &content);
            steps.push(AgentStep {
                tool: sanitized.call.name,
                arguments: sanitized.call.arguments,
                success,
                output,
            });
            if let GuardDecision::Terminate(answer) = decision {
                break answer;
            }
        };

        info!(
            conversation_id = %conversation_id,
            steps = state.step_count(),
            reason = ?answer.reason,
            "Agent run finished"
        );
        Ok(AgentOutcome {
            conversation_id,
            response: answer.text,
            reason: answer.reason,
            step_count: state.step_count(),
            steps,
        })
    }
}

/// Invokes the tool, turning failures and incomplete argument sets into
/// error-shaped results.
async fn dispatch(spec: &ToolSpec, sanitized: &SanitizedCall) -> Value {
    if !sanitized.is_complete() {
        let missing = &sanitized.missing[0];
        warn!(tool = %spec.name(), missing = %missing, "Refusing call with missing argument");
        return Value::String(format!("Error: missing required argument '{missing}'"));
    }
    debug!(tool = %spec.name(), "Dispatching tool");
    match spec.invoke(&sanitized.call.arguments).await {
        Ok(output) => output,
        Err(err) => {
            warn!(tool = %spec.name(), error = %err, "Tool execution failed");
            Value::String(format!("Error: {err}"))
        }
    }
}
