//! Line-oriented command shell for the client.
//!
//! Parsing is kept separate from execution so the shell can be driven by any
//! [`MessageApi`] and any pair of async reader/writer, which is how the tests
//! run it without a terminal or a network.

use anyhow::Result;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    message::{GetMessagesRequest, SendMessageRequest},
    service::MessageApi,
};

pub const PROMPT: &str = "Enter command (SEND <message>, GET <num_of_messages> or EXIT): ";

const LINE_ENDINGS: &[char] = &['\n', '\r'];

#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Send { text: String },
    Get { count: i32 },
    Exit,
}

/// Input the shell rejects locally. The messages are printed verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid count. Please enter an integer.")]
    InvalidCount,
    #[error("Invalid command. Use SEND <message>, GET <num_of_messages> or EXIT.")]
    UnknownCommand,
}

impl ConsoleCommand {
    /// Parses one line of input, already stripped of its line terminator.
    ///
    /// Keywords are case-sensitive. Everything after `SEND ` is the message,
    /// including leading spaces, so `SEND ` posts an empty message.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        if let Some(text) = line.strip_prefix("SEND ") {
            return Ok(ConsoleCommand::Send {
                text: text.to_string(),
            });
        }

        if let Some(count) = line.strip_prefix("GET ") {
            return count
                .trim()
                .parse()
                .map(|count| ConsoleCommand::Get { count })
                .map_err(|_| CommandError::InvalidCount);
        }

        if line == "EXIT" {
            return Ok(ConsoleCommand::Exit);
        }

        Err(CommandError::UnknownCommand)
    }
}

/// Runs the shell until `EXIT` or end of input.
pub async fn run_repl<A, R, W>(api: &mut A, input: &mut R, output: &mut W) -> Result<()>
where
    A: MessageApi + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            break;
        }

        let command = match ConsoleCommand::parse(line.trim_end_matches(LINE_ENDINGS)) {
            Ok(command) => command,
            Err(err) => {
                write_line(output, &err.to_string()).await?;
                continue;
            }
        };

        if !execute(api, command, output).await? {
            break;
        }
    }

    Ok(())
}

async fn execute<A, W>(api: &mut A, command: ConsoleCommand, output: &mut W) -> Result<bool>
where
    A: MessageApi + ?Sized,
    W: AsyncWrite + Unpin,
{
    match command {
        ConsoleCommand::Send { text } => {
            let response = api
                .send_message(SendMessageRequest { message: text })
                .await?;
            write_line(output, &response.status).await?;
            Ok(true)
        }
        ConsoleCommand::Get { count } => {
            let response = api.get_messages(GetMessagesRequest { count }).await?;
            write_line(output, "Last messages:").await?;
            // Most recent first.
            for message in response.messages.iter().rev() {
                write_line(output, &format!("- {message}")).await?;
            }
            Ok(true)
        }
        ConsoleCommand::Exit => {
            write_line(output, "Exiting...").await?;
            Ok(false)
        }
    }
}

async fn write_line<W>(output: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
