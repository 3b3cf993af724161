use std::io::Write;

use super::{Record, Reporter};
use crate::error::Result;

/// Writes graphs and rankings as JSON and closure paths one per line
pub struct JsonReporter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_json<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, value)?;
        } else {
            serde_json::to_writer(&mut self.writer, value)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

impl JsonReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn emit(&mut self, record: Record<'_>) -> Result<()> {
        match record {
            Record::Graph(graph) => self.write_json(graph)?,
            Record::Usage(ranking) => self.write_json(ranking)?,
            Record::Path(path) => writeln!(self.writer, "{}", path.display())?,
        }
        // Closure paths stream as they are found
        self.writer.flush()?;
        Ok(())
    }
}
