//! Typed transcripts from standard input
//!
//! Stands in for a microphone when no speech capture command is configured:
//! each line typed is one utterance. End of input closes the listener.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{transcript, Heard, Listener};

pub struct StdinListener<R = Stdin> {
    lines: Mutex<Lines<BufReader<R>>>,
}

impl StdinListener {
    pub fn new() -> Self {
        Self::from_reader(tokio::io::stdin())
    }
}

impl Default for StdinListener {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncRead + Unpin> StdinListener<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: Mutex::new(BufReader::new(reader).lines()),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> Listener for StdinListener<R> {
    async fn listen(&self, timeout: Duration, max_phrase: Duration) -> Heard {
        info!("listening (type your command)");
        let budget = timeout + max_phrase;
        let mut lines = self.lines.lock().await;

        match tokio::time::timeout(budget, lines.next_line()).await {
            Ok(Ok(Some(line))) => transcript(&line),
            Ok(Ok(None)) => {
                info!("end of input reached");
                Heard::Closed
            }
            Ok(Err(e)) => {
                warn!(error = %e, "failed to read from stdin");
                Heard::Silence
            }
            Err(_) => {
                debug!("no input within the timeout period");
                Heard::Silence
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lines_then_end_of_input() {
        let listener = StdinListener::from_reader(&b"  open the report \n\n"[..]);
        let budget = Duration::from_secs(1);

        assert_eq!(
            listener.listen(budget, budget).await,
            Heard::Utterance("open the report".to_string())
        );
        assert_eq!(listener.listen(budget, budget).await, Heard::Silence);
        assert_eq!(listener.listen(budget, budget).await, Heard::Closed);
        assert_eq!(listener.listen(budget, budget).await, Heard::Closed);
    }
}
