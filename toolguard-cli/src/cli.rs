use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "toolguard",
    version,
    about = "Bounded tool-calling agent powered by Ollama"
)]
pub struct Cli {
    /// Configuration file (defaults to config/agent.toml when present)
    #[arg(long)]
    pub config: Option<String>,
    /// Model name, overriding the configuration
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub ollama_url: Option<String>,
    /// Extra system instructions appended to the tool catalog
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long)]
    pub max_steps: Option<usize>,
    #[arg(long)]
    pub max_tool_calls: Option<usize>,
    /// Disable logging
    #[arg(long, short)]
    pub quiet: bool,
    /// Print the full outcome as JSON instead of only the answer
    #[arg(long)]
    pub json: bool,
    #[arg()]
    pub prompt: Vec<String>,
}

impl Cli {
    /// The one-shot prompt, if any words were given.
    pub fn prompt(&self) -> Option<String> {
        let joined = self.prompt.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
