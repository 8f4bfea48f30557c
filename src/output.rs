//! JSON lines output
//!
//! Writes one record per line to any `Write` target, stdout by default.

use crate::error::Result;
use crate::roles::{Sink, SinkOutcome};
use crate::types::Record;
use async_trait::async_trait;
use std::io::{self, Stdout, Write};

/// Sink printing each record as a single JSON line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send = Stdout> {
    writer: W,
    pretty: bool,
}

impl JsonLinesSink<Stdout> {
    /// Print to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
        }
    }

    /// Pretty-print records (one record no longer fits one line)
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Take back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> Sink for JsonLinesSink<W> {
    async fn write(&mut self, record: &Record) -> Result<SinkOutcome> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, record)?;
        } else {
            serde_json::to_writer(&mut self.writer, record)?;
        }
        self.writer.write_all(b"\n")?;
        Ok(SinkOutcome::Written)
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_one_line_per_record() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write(&json!({"a": 1})).await.unwrap();
        sink.write(&json!([1, "two"])).await.unwrap();
        sink.flush().await.unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "{\"a\":1}\n[1,\"two\"]\n");
    }

    #[tokio::test]
    async fn test_pretty_output() {
        let mut sink = JsonLinesSink::new(Vec::new()).pretty(true);
        let outcome = sink.write(&json!({"a": 1})).await.unwrap();

        assert_eq!(outcome, SinkOutcome::Written);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}\n");
    }
}
