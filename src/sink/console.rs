//! Live per-port lines on the terminal.

use super::Sink;
use crate::error::SinkError;
use crate::scanner::{PortStatus, ProbeResult};
use crate::services::service_name;
use async_trait::async_trait;
use console::style;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;

/// Prints one colored line per result.
///
/// The writer is shared by every worker, so each line is written and flushed
/// under the lock to keep lines whole.
pub struct ConsoleSink<W = Stdout> {
    out: Mutex<W>,
    show_closed: bool,
}

impl ConsoleSink<Stdout> {
    pub fn stdout(show_closed: bool) -> Self {
        Self::new(io::stdout(), show_closed)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, show_closed: bool) -> Self {
        Self {
            out: Mutex::new(out),
            show_closed,
        }
    }

    /// Recover the writer, mainly for inspecting captured output.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Render the line for one result, without a trailing newline.
fn format_line(result: &ProbeResult) -> String {
    let service = service_name(result.port).unwrap_or("");
    let line = format!(
        "{:<8} Port {:>5} {}",
        format!("[{}]", result.status()),
        result.port,
        service
    );
    let line = line.trim_end().to_string();

    match result.status() {
        PortStatus::Open => style(line).green().bold().to_string(),
        PortStatus::Closed => style(line).red().to_string(),
    }
}

#[async_trait]
impl<W: Write + Send> Sink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    async fn consume(&self, result: &ProbeResult) -> Result<(), SinkError> {
        if !result.is_open && !self.show_closed {
            return Ok(());
        }

        let line = format_line(result);
        let mut out = self
            .out
            .lock()
            .map_err(|_| SinkError::Poisoned(self.name().to_string()))?;
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| SinkError::Poisoned(self.name().to_string()))?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;

    fn result(port: u16, is_open: bool) -> ProbeResult {
        ProbeResult::new(Port::new(port).unwrap(), is_open)
    }

    fn captured(sink: ConsoleSink<Vec<u8>>) -> String {
        console::strip_ansi_codes(&String::from_utf8(sink.into_inner()).unwrap()).into_owned()
    }

    #[tokio::test]
    async fn test_open_and_closed_lines() {
        let sink = ConsoleSink::new(Vec::new(), true);
        sink.consume(&result(22, true)).await.unwrap();
        sink.consume(&result(23, false)).await.unwrap();
        sink.consume(&result(40000, false)).await.unwrap();

        let text = captured(sink);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[OPEN]   Port    22 SSH");
        assert_eq!(lines[1], "[CLOSED] Port    23 Telnet");
        assert_eq!(lines[2], "[CLOSED] Port 40000");
    }

    #[tokio::test]
    async fn test_hides_closed_when_asked() {
        let sink = ConsoleSink::new(Vec::new(), false);
        sink.consume(&result(80, true)).await.unwrap();
        sink.consume(&result(81, false)).await.unwrap();

        let text = captured(sink);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("Port    80 HTTP"));
    }
}
