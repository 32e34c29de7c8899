//! Interactive question loop over the report narrative.
//!
//! The session owns nothing but the narrative. Each question becomes one
//! prompt; a failed generation is shown to the user and the loop goes on.

use crate::assistant::client::TextGenerator;
use crate::error::GenerationError;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, warn};

/// Typing this (any case) ends the session.
pub const EXIT_TOKEN: &str = "exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingQuestion,
    ComposingPrompt(String),
    AwaitingAnswer(String),
    DisplayingAnswer(Result<String, GenerationError>),
    Closed,
}

/// Prompt for one user question.
pub fn compose_prompt(narrative: &str, question: &str) -> String {
    format!(
        "Answer the following question based on the provided information: '{}'. Question: '{}'",
        narrative, question
    )
}

pub fn sentiment_prompt(narrative: &str) -> String {
    format!(
        "Analyze the sentiment of the following statement: '{}'",
        narrative
    )
}

pub fn summary_prompt(narrative: &str) -> String {
    format!(
        "Summarize the following statement in a concise and informative manner: '{}'",
        narrative
    )
}

pub struct QuerySession<'a> {
    generator: &'a dyn TextGenerator,
    narrative: String,
    turn_timeout: Duration,
}

impl<'a> QuerySession<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        narrative: String,
        turn_timeout: Duration,
    ) -> Self {
        Self {
            generator,
            narrative,
            turn_timeout,
        }
    }

    /// One generation call, bounded by the turn timeout.
    async fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.turn_timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                seconds: self.turn_timeout.as_secs(),
            }),
        }
    }

    /// Sentiment and summary of the narrative, shown before the first question.
    pub async fn brief<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "\nLLM Analysis:")?;

        match self.ask(&sentiment_prompt(&self.narrative)).await {
            Ok(text) => writeln!(output, "Sentiment Analysis:\n{}", text)?,
            Err(e) => writeln!(output, "Sentiment Analysis failed: {}", e)?,
        }
        match self.ask(&summary_prompt(&self.narrative)).await {
            Ok(text) => writeln!(output, "Summary:\n{}", text)?,
            Err(e) => writeln!(output, "Summary failed: {}", e)?,
        }

        Ok(())
    }

    /// Move one step through the state machine.
    async fn advance<R: BufRead, W: Write>(
        &self,
        state: SessionState,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<SessionState> {
        let next = match state {
            SessionState::AwaitingQuestion => {
                write!(
                    output,
                    "Enter your question (or '{}' to quit): ",
                    EXIT_TOKEN
                )?;
                output.flush()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    writeln!(output)?;
                    return Ok(SessionState::Closed);
                }

                // The question is kept as typed; blanks only matter for exit and empty input.
                let question = line.trim_end_matches(['\r', '\n']);
                if question.trim().eq_ignore_ascii_case(EXIT_TOKEN) {
                    SessionState::Closed
                } else if question.trim().is_empty() {
                    SessionState::AwaitingQuestion
                } else {
                    SessionState::ComposingPrompt(question.to_string())
                }
            }
            SessionState::ComposingPrompt(question) => {
                SessionState::AwaitingAnswer(compose_prompt(&self.narrative, &question))
            }
            SessionState::AwaitingAnswer(prompt) => {
                debug!("Sending prompt ({} chars)", prompt.len());
                SessionState::DisplayingAnswer(self.ask(&prompt).await)
            }
            SessionState::DisplayingAnswer(Ok(answer)) => {
                writeln!(output, "Answer: {}", answer)?;
                SessionState::AwaitingQuestion
            }
            SessionState::DisplayingAnswer(Err(e)) => {
                warn!("Generation failed: {}", e);
                writeln!(output, "Error: generation service error: {}", e)?;
                SessionState::AwaitingQuestion
            }
            SessionState::Closed => SessionState::Closed,
        };
        Ok(next)
    }

    /// Run until the exit token or end of input. Returns the number of
    /// questions sent to the service.
    pub async fn run<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<usize> {
        writeln!(output, "\nAsk a question about the award data:")?;

        let mut asked = 0;
        let mut state = SessionState::AwaitingQuestion;
        while state != SessionState::Closed {
            if matches!(state, SessionState::AwaitingAnswer(_)) {
                asked += 1;
            }
            state = self.advance(state, input, output).await?;
        }

        debug!("Session closed after {} questions", asked);
        Ok(asked)
    }
}
