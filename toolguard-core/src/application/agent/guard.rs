use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use super::call::CanonicalCall;
use crate::config::GuardConfig;
use crate::constants::FINAL_ANSWER;

/// Why a conversation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TerminationReason {
    /// The model produced a final answer that was accepted.
    Answered,
    /// The model's final answer carried a veto marker.
    VetoedAnswer,
    StepBudget,
    ToolCallBudget { tool: String },
    DuplicateCall { tool: String },
    ErrorStreak { tool: String },
    ModelUnavailable,
}

impl TerminationReason {
    pub fn is_answered(&self) -> bool {
        matches!(self, TerminationReason::Answered)
    }

    fn explain(&self, config: &GuardConfig) -> String {
        match self {
            TerminationReason::Answered => config.fallback_answer.clone(),
            TerminationReason::VetoedAnswer => {
                "Stopped: the model's answer reported an error.".to_string()
            }
            TerminationReason::StepBudget => format!(
                "Stopped: exceeded the step budget of {} steps.",
                config.max_steps
            ),
            TerminationReason::ToolCallBudget { tool } => format!(
                "Stopped: tool '{tool}' exceeded its budget of {} calls.",
                config.max_tool_calls
            ),
            TerminationReason::DuplicateCall { tool } => {
                format!("Stopped: tool '{tool}' was requested again after it already answered.")
            }
            TerminationReason::ErrorStreak { tool } => format!(
                "Stopped: tool '{tool}' failed more than {} times in a row.",
                config.error_threshold
            ),
            TerminationReason::ModelUnavailable => {
                "Stopped: the model backend did not respond.".to_string()
            }
        }
    }
}

/// The one terminal result of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalAnswer {
    pub text: String,
    pub reason: TerminationReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Terminate(FinalAnswer),
}

/// Per-conversation counters. Created zeroed at conversation start and
/// owned by the loop driver; never shared between conversations.
#[derive(Debug, Clone, Default)]
pub struct GuardState {
    step_count: usize,
    call_counts: HashMap<String, usize>,
    answered_tools: HashSet<String>,
    consecutive_error_count: usize,
    last_error_tool: Option<String>,
    final_answer: Option<FinalAnswer>,
}

impl GuardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn call_count(&self, tool: &str) -> usize {
        self.call_counts.get(tool).copied().unwrap_or(0)
    }

    pub fn is_answered(&self, tool: &str) -> bool {
        self.answered_tools.contains(tool)
    }

    pub fn consecutive_error_count(&self) -> usize {
        self.consecutive_error_count
    }

    pub fn last_error_tool(&self) -> Option<&str> {
        self.last_error_tool.as_deref()
    }

    pub fn is_terminated(&self) -> bool {
        self.final_answer.is_some()
    }

    pub fn final_answer(&self) -> Option<&FinalAnswer> {
        self.final_answer.as_ref()
    }

    fn errors_for(&self, tool: &str) -> usize {
        match self.last_error_tool.as_deref() {
            Some(last) if last == tool => self.consecutive_error_count,
            _ => 0,
        }
    }
}

/// Stateless decision layer over a [`GuardState`]. One policy object covers
/// every agent variant; the variants differ only in [`GuardConfig`].
#[derive(Debug, Clone, Default)]
pub struct GuardPolicy {
    config: GuardConfig,
}

impl GuardPolicy {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Counts one loop iteration. Terminates instead of counting once the
    /// step budget is spent, so `step_count` never exceeds `max_steps`.
    pub fn begin_step(&self, state: &mut GuardState) -> GuardDecision {
        if let Some(answer) = &state.final_answer {
            return GuardDecision::Terminate(answer.clone());
        }
        if state.step_count >= self.config.max_steps {
            warn!(steps = state.step_count, "Step budget exhausted");
            return GuardDecision::Terminate(self.terminate(state, TerminationReason::StepBudget));
        }
        state.step_count += 1;
        GuardDecision::Allow
    }

    /// Decides whether `call` may be dispatched. On allow the tool's call
    /// count is incremented.
    pub fn admit(&self, state: &mut GuardState, call: &CanonicalCall) -> GuardDecision {
        if let Some(answer) = &state.final_answer {
            return GuardDecision::Terminate(answer.clone());
        }
        let tool = call.name.as_str();

        if state.step_count > self.config.max_steps {
            return GuardDecision::Terminate(self.terminate(state, TerminationReason::StepBudget));
        }
        if state.call_count(tool) >= self.config.max_tool_calls {
            warn!(tool = %tool, calls = state.call_count(tool), "Tool call budget exhausted");
            return GuardDecision::Terminate(self.terminate(
                state,
                TerminationReason::ToolCallBudget {
                    tool: tool.to_string(),
                },
            ));
        }
        if self.config.suppress_duplicates && state.is_answered(tool) {
            warn!(tool = %tool, "Duplicate call to an already answered tool");
            return GuardDecision::Terminate(self.terminate(
                state,
                TerminationReason::DuplicateCall {
                    tool: tool.to_string(),
                },
            ));
        }
        if state.errors_for(tool) > self.config.error_threshold {
            return GuardDecision::Terminate(self.terminate(
                state,
                TerminationReason::ErrorStreak {
                    tool: tool.to_string(),
                },
            ));
        }

        *state.call_counts.entry(tool.to_string()).or_insert(0) += 1;
        debug!(tool = %tool, calls = state.call_count(tool), "Guard admitted call");
        GuardDecision::Allow
    }

    /// Books a tool result. Error-shaped results extend the tool's error
    /// streak and never mark it answered.
    pub fn record_result(&self, state: &mut GuardState, tool: &str, output: &str) -> GuardDecision {
        if let Some(answer) = &state.final_answer {
            return GuardDecision::Terminate(answer.clone());
        }

        if self.config.is_error_shaped(output) {
            if state.last_error_tool.as_deref() == Some(tool) {
                state.consecutive_error_count += 1;
            } else {
                state.last_error_tool = Some(tool.to_string());
                state.consecutive_error_count = 1;
            }
            debug!(
                tool = %tool,
                streak = state.consecutive_error_count,
                "Tool returned an error-shaped result"
            );
            if state.consecutive_error_count > self.config.error_threshold {
                warn!(
                    tool = %tool,
                    streak = state.consecutive_error_count,
                    "Error streak exceeded threshold"
                );
                return GuardDecision::Terminate(self.terminate(
                    state,
                    TerminationReason::ErrorStreak {
                        tool: tool.to_string(),
                    },
                ));
            }
            return GuardDecision::Allow;
        }

        if tool != FINAL_ANSWER {
            state.answered_tools.insert(tool.to_string());
        }
        if state.last_error_tool.as_deref() == Some(tool) {
            state.consecutive_error_count = 0;
            state.last_error_tool = None;
        }
        GuardDecision::Allow
    }

    /// Accepts the model's final answer unless it carries a veto marker, in
    /// which case the fallback replaces it.
    pub fn accept_final(&self, state: &mut GuardState, text: String) -> FinalAnswer {
        if let Some(answer) = &state.final_answer {
            return answer.clone();
        }
        if self.config.is_vetoed(&text) {
            warn!("Final answer carried a veto marker; using fallback");
            return self.terminate(state, TerminationReason::VetoedAnswer);
        }
        let answer = FinalAnswer {
            text,
            reason: TerminationReason::Answered,
        };
        state.final_answer = Some(answer.clone());
        answer
    }

    /// Ends the conversation with the fallback for `reason`. The first
    /// terminal answer wins; later calls return it unchanged.
    pub fn terminate(&self, state: &mut GuardState, reason: TerminationReason) -> FinalAnswer {
        if let Some(answer) = &state.final_answer {
            return answer.clone();
        }
        let text = if self.config.explain_termination {
            reason.explain(&self.config)
        } else {
            self.config.fallback_answer.clone()
        };
        let answer = FinalAnswer { text, reason };
        state.final_answer = Some(answer.clone());
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    const FALLBACK: &str = "I don't know the answer.";

    fn call(name: &str) -> CanonicalCall {
        CanonicalCall::new(name, Map::new())
    }

    fn fallback_reason(decision: GuardDecision) -> TerminationReason {
        match decision {
            GuardDecision::Terminate(answer) => {
                assert_eq!(answer.text, FALLBACK);
                answer.reason
            }
            GuardDecision::Allow => panic!("expected termination"),
        }
    }

    #[test]
    fn step_count_never_exceeds_budget() {
        let policy = GuardPolicy::new(GuardConfig::default().with_max_steps(3));
        let mut state = GuardState::new();
        for _ in 0..3 {
            assert_eq!(policy.begin_step(&mut state), GuardDecision::Allow);
        }
        assert_eq!(
            fallback_reason(policy.begin_step(&mut state)),
            TerminationReason::StepBudget
        );
        assert_eq!(state.step_count(), 3);
        assert!(state.is_terminated());
    }

    #[test]
    fn per_tool_budget_caps_invocations() {
        let policy = GuardPolicy::new(
            GuardConfig::default()
                .with_max_tool_calls(2)
                .with_duplicate_suppression(false),
        );
        let mut state = GuardState::new();
        for _ in 0..2 {
            assert_eq!(policy.admit(&mut state, &call("multiply")), GuardDecision::Allow);
            assert_eq!(policy.record_result(&mut state, "multiply", "6"), GuardDecision::Allow);
        }
        assert_eq!(
            fallback_reason(policy.admit(&mut state, &call("multiply"))),
            TerminationReason::ToolCallBudget {
                tool: "multiply".into()
            }
        );
        assert_eq!(state.call_count("multiply"), 2);
    }

    #[test]
    fn budgets_are_tracked_per_tool() {
        let policy = GuardPolicy::new(
            GuardConfig::default()
                .with_max_tool_calls(1)
                .with_duplicate_suppression(false),
        );
        let mut state = GuardState::new();
        assert_eq!(policy.admit(&mut state, &call("multiply")), GuardDecision::Allow);
        assert_eq!(policy.admit(&mut state, &call("calculator")), GuardDecision::Allow);
    }

    #[test]
    fn answered_tool_is_not_dispatched_again() {
        let policy = GuardPolicy::new(GuardConfig::default().with_max_tool_calls(5));
        let mut state = GuardState::new();
        assert_eq!(policy.admit(&mut state, &call("search")), GuardDecision::Allow);
        policy.record_result(&mut state, "search", "Paris is the capital");
        assert!(state.is_answered("search"));
        assert_eq!(
            fallback_reason(policy.admit(&mut state, &call("search"))),
            TerminationReason::DuplicateCall {
                tool: "search".into()
            }
        );
    }

    #[test]
    fn error_results_do_not_mark_tool_answered() {
        let policy = GuardPolicy::new(GuardConfig::default().with_max_tool_calls(5));
        let mut state = GuardState::new();
        policy.admit(&mut state, &call("search"));
        assert_eq!(
            policy.record_result(&mut state, "search", "Search failed: timeout"),
            GuardDecision::Allow
        );
        assert!(!state.is_answered("search"));
        assert_eq!(policy.admit(&mut state, &call("search")), GuardDecision::Allow);
    }

    #[test]
    fn third_consecutive_error_terminates_at_threshold_two() {
        let policy = GuardPolicy::new(
            GuardConfig::default()
                .with_max_tool_calls(10)
                .with_error_threshold(2),
        );
        let mut state = GuardState::new();
        for _ in 0..2 {
            assert_eq!(policy.admit(&mut state, &call("calculator")), GuardDecision::Allow);
            assert_eq!(
                policy.record_result(&mut state, "calculator", "Error: bad input"),
                GuardDecision::Allow
            );
        }
        assert_eq!(policy.admit(&mut state, &call("calculator")), GuardDecision::Allow);
        assert_eq!(
            fallback_reason(policy.record_result(&mut state, "calculator", "Error: bad input")),
            TerminationReason::ErrorStreak {
                tool: "calculator".into()
            }
        );
    }

    #[test]
    fn success_resets_the_error_streak() {
        let policy = GuardPolicy::new(
            GuardConfig::default()
                .with_max_tool_calls(10)
                .with_duplicate_suppression(false),
        );
        let mut state = GuardState::new();
        policy.record_result(&mut state, "calculator", "Error: bad input");
        policy.record_result(&mut state, "calculator", "Error: bad input");
        policy.record_result(&mut state, "calculator", "4");
        assert_eq!(state.consecutive_error_count(), 0);
        assert_eq!(state.last_error_tool(), None);
        assert_eq!(
            policy.record_result(&mut state, "calculator", "Error: bad input"),
            GuardDecision::Allow
        );
        assert_eq!(state.consecutive_error_count(), 1);
    }

    #[test]
    fn a_different_tool_restarts_the_streak() {
        let policy = GuardPolicy::default();
        let mut state = GuardState::new();
        policy.record_result(&mut state, "calculator", "Error: one");
        policy.record_result(&mut state, "calculator", "Error: two");
        policy.record_result(&mut state, "multiply", "Error: three");
        assert_eq!(state.last_error_tool(), Some("multiply"));
        assert_eq!(state.consecutive_error_count(), 1);
        assert!(!state.is_terminated());
    }

    #[test]
    fn terminated_state_short_circuits_everything() {
        let policy = GuardPolicy::default();
        let mut state = GuardState::new();
        let first = policy.accept_final(&mut state, "Paris".into());
        assert_eq!(first.reason, TerminationReason::Answered);

        let again = policy.terminate(&mut state, TerminationReason::StepBudget);
        assert_eq!(again, first);
        assert_eq!(policy.begin_step(&mut state), GuardDecision::Terminate(first.clone()));
        assert_eq!(
            policy.admit(&mut state, &call("multiply")),
            GuardDecision::Terminate(first.clone())
        );
        assert_eq!(policy.accept_final(&mut state, "Lyon".into()), first);
        assert_eq!(state.call_count("multiply"), 0);
    }

    #[test]
    fn vetoed_final_answer_uses_fallback() {
        let policy = GuardPolicy::default();
        let mut state = GuardState::new();
        let answer = policy.accept_final(&mut state, "Error: tool crashed".into());
        assert_eq!(answer.text, FALLBACK);
        assert_eq!(answer.reason, TerminationReason::VetoedAnswer);
    }

    #[test]
    fn explained_termination_names_the_reason() {
        let policy = GuardPolicy::new(
            GuardConfig::default()
                .with_max_steps(1)
                .with_explained_termination(true),
        );
        let mut state = GuardState::new();
        policy.begin_step(&mut state);
        match policy.begin_step(&mut state) {
            GuardDecision::Terminate(answer) => {
                assert_eq!(answer.text, "Stopped: exceeded the step budget of 1 steps.")
            }
            GuardDecision::Allow => panic!("expected termination"),
        }
    }
}
