//! JSON annotation formatter

use super::AnnotationFormatter;
use anyhow::Result;
use std::io::Write;

/// Writes a JSON array with one compact object per line, one per row
pub struct JsonFormatter<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }
}

impl<W: Write + Send> AnnotationFormatter for JsonFormatter<W> {
    fn write_annotation(&mut self, annotation: &utok_core::SentenceAnnotation) -> Result<()> {
        self.writer.write_all(if self.count == 0 { b"[" } else { b",\n" })?;
        serde_json::to_writer(&mut self.writer, annotation)?;
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.count == 0 {
            self.writer.write_all(b"[")?;
        }
        writeln!(self.writer, "]")?;
        self.writer.flush()?;
        Ok(())
    }
}
