//! Interactive question/answer IO.
//!
//! The clarification loop needs to surface questions to whoever is driving
//! the run and read back free-text answers. Hiding that behind a trait keeps
//! the loop itself a pure state transition over (state, answer) pairs and
//! independently testable without a real terminal.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Displays a question and solicits a single free-text answer.
#[async_trait]
pub trait Questioner: Send + Sync {
    /// Shows `question` and returns the trimmed answer line.
    ///
    /// An empty string is a valid answer: it means the user declined to
    /// answer and the round is dropped by the caller.
    async fn ask(&self, question: &str) -> std::io::Result<String>;
}

/// Questioner reading answers from standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinQuestioner;

#[async_trait]
impl Questioner for StdinQuestioner {
    async fn ask(&self, question: &str) -> std::io::Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{question}\n> ").as_bytes())
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader.read_line(&mut line).await?;
        Ok(line.trim().to_string())
    }
}
