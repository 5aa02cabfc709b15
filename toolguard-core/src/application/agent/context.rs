use serde::Serialize;

use crate::constants::FINAL_ANSWER;
use crate::tooling::{ToolDescriptor, ToolRegistry};

/// Tool catalogue embedded in the system prompt.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ToolContext {
    pub tools: Vec<ToolDescriptor>,
}

impl ToolContext {
    pub fn from_registry(registry: &ToolRegistry) -> Self {
        Self {
            tools: registry.descriptors(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

pub fn compose_system_instructions(context: &ToolContext, custom: Option<&str>) -> String {
    let mut sections = Vec::new();
    if let Some(custom) = custom.map(str::trim).filter(|text| !text.is_empty()) {
        sections.push(custom.to_string());
    }

    if context.is_empty() {
        sections.push(format!(
            "No tools are available. Reply with a single JSON object \
             {{\"name\": \"{FINAL_ANSWER}\", \"arguments\": {{\"response\": \"<answer>\"}}}}."
        ));
        return sections.join("\n\n");
    }

    let catalogue = serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());
    sections.push(format!(
        "You can use tools. To call one, reply with a single JSON object and nothing else:\n\
         {{\"name\": \"<tool name>\", \"arguments\": {{\"<parameter>\": <value>}}}}\n\
         When you know the answer, reply with:\n\
         {{\"name\": \"{FINAL_ANSWER}\", \"arguments\": {{\"response\": \"<answer>\"}}}}\n\
         Call a tool only when you need it and never repeat a call that already \
         returned a result.\n\nAvailable tools:\n{catalogue}"
    ));
    sections.join("\n\n")
}
