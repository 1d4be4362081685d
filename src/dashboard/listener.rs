// dashboard/listener.rs

use crate::dashboard::Dashboard;
use crate::dashboard::command_handler::{HELP, handle_command};
use tokio::io::{self, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

const PROMPT: &str = "stock-scope> ";

async fn write_prompt<W: AsyncWrite + Unpin>(out: &mut W) -> io::Result<()> {
    out.write_all(PROMPT.as_bytes()).await?;
    out.flush().await
}

/// Reads commands line by line from stdin until `quit` or EOF.
pub async fn listen_for_commands(dashboard: &mut Dashboard) {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    println!("{HELP}");

    loop {
        if let Err(e) = write_prompt(&mut stdout).await {
            warn!("Failed to write prompt: {}", e);
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("stdin closed, stopping listener");
                break;
            }
            Err(e) => {
                warn!("Failed to read command: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = handle_command(&line, dashboard).await;
        println!("{}", reply.text);
        if reply.quit {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prompt_is_written_and_flushed() {
        let mut out: Vec<u8> = Vec::new();
        write_prompt(&mut out).await.unwrap();
        assert_eq!(out, PROMPT.as_bytes());
    }
}
