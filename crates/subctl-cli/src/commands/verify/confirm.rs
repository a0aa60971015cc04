//! Operator confirmation for disruptive verifications
//!
//! The prompt is a trait so the command can run the same way with a
//! terminal attached, with stdin redirected, or under test.

use std::io::IsTerminal;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Outcome of asking the operator a yes/no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
    /// No operator is attached to answer
    Unavailable,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, question: &str) -> Result<Confirmation>;
}

/// Reads the answer from stdin; end of input means nobody is there to answer.
pub struct InteractiveConfirmer;

#[async_trait]
impl Confirmer for InteractiveConfirmer {
    async fn confirm(&self, question: &str) -> Result<Confirmation> {
        let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
        let mut writer = tokio::io::stdout();
        prompt(&mut reader, &mut writer, question).await
    }
}

/// Write `question` to `writer` and read one answer line from `reader`.
async fn prompt<R, W>(reader: &mut R, writer: &mut W, question: &str) -> Result<Confirmation>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("{} [y/N] ", question).as_bytes())
        .await?;
    writer.flush().await?;

    let mut input = String::new();
    if reader.read_line(&mut input).await? == 0 {
        return Ok(Confirmation::Unavailable);
    }
    Ok(parse_answer(&input))
}

/// Never prompts.
pub struct NonInteractiveConfirmer;

#[async_trait]
impl Confirmer for NonInteractiveConfirmer {
    async fn confirm(&self, _question: &str) -> Result<Confirmation> {
        Ok(Confirmation::Unavailable)
    }
}

/// Pick the interactive confirmer when stdin is a terminal.
pub fn confirmer_for_stdin() -> Box<dyn Confirmer> {
    if std::io::stdin().is_terminal() {
        Box::new(InteractiveConfirmer)
    } else {
        Box::new(NonInteractiveConfirmer)
    }
}

fn parse_answer(input: &str) -> Confirmation {
    let answer = input.trim();
    if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
        Confirmation::Accepted
    } else {
        Confirmation::Declined
    }
}
