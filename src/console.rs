//! Interactive console — reads lines from stdin, runs each through the agent,
//! prints the reply to stdout.
//!
//! Enabled with `-i`. Shares the agent (and therefore the memory window) with
//! the HTTP server. Runs until the `shutdown` token is cancelled or stdin is
//! closed.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::error::AppError;

/// Run the console on the process's stdin/stdout.
pub async fn run(agent: Agent, shutdown: CancellationToken) -> Result<(), AppError> {
    info!("console started — type a message and press Enter. Ctrl-C to quit.");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_with(agent, stdin, stdout, shutdown).await
}

/// Console loop over arbitrary reader/writer, for tests.
pub async fn run_with<R, W>(
    agent: Agent,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    output.write_all(b"> ").await?;
    output.flush().await?;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("console stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim();
                        if input.is_empty() {
                            output.write_all(b"> ").await?;
                            output.flush().await?;
                            continue;
                        }

                        debug!(input = %input, "console received line");

                        match agent.process(input).await {
                            Ok(result) => {
                                let tool = if result.tool_used { " [tool]" } else { "" };
                                output
                                    .write_all(format!("{}{tool}\n> ", result.response).as_bytes())
                                    .await?;
                            }
                            Err(e) => {
                                warn!("console processing failed: {e}");
                                output.write_all(format!("error: {e}\n> ").as_bytes()).await?;
                            }
                        }
                        output.flush().await?;
                    }
                }
            }
        }
    }

    Ok(())
}
