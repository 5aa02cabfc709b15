//! Interactive read loop: one conversation per line until `exit` or `quit`.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use toolguard_core::agent::Agent;
use toolguard_core::model::ModelProvider;
use tracing::{info, warn};

use crate::error::CliError;

const EXIT_WORDS: &[&str] = &["exit", "quit"];

pub async fn run<P: ModelProvider>(agent: &Agent<P>) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("Entering interactive mode; type 'exit' or 'quit' to leave");

    loop {
        stdout.write_all(b"Me: ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let task = line.trim();
        if task.is_empty() {
            continue;
        }
        if is_exit(task) {
            break;
        }

        let reply = match agent.run(task).await {
            Ok(outcome) => outcome.response,
            Err(err) => {
                warn!(error = %err, "Conversation failed");
                format!("Error: {err}")
            }
        };
        stdout.write_all(format!("Agent: {reply}\n").as_bytes()).await?;
    }
    stdout.flush().await?;
    Ok(())
}

fn is_exit(task: &str) -> bool {
    EXIT_WORDS.iter().any(|word| task.eq_ignore_ascii_case(word))
}
