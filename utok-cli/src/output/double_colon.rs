//! Double-colon annotation formatter

use super::AnnotationFormatter;
use anyhow::Result;
use std::io::Write;
use utok_core::SentenceAnnotation;

/// Writes `::line ID ::s SENTENCE` followed by one `::span` record per token
pub struct DoubleColonFormatter<W: Write> {
    writer: W,
}

impl<W: Write> DoubleColonFormatter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> AnnotationFormatter for DoubleColonFormatter<W> {
    fn write_annotation(&mut self, annotation: &SentenceAnnotation) -> Result<()> {
        writeln!(self.writer, "::line {} ::s {}", annotation.id, annotation.snt)?;
        for entry in &annotation.chart {
            write!(self.writer, "::span {} ::type {} ", entry.span, entry.kind)?;
            if let Some(sem_class) = &entry.sem_class {
                write!(self.writer, "::sem-class {sem_class} ")?;
            }
            writeln!(self.writer, "::surf {}", entry.surf)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utok_core::AnnotationEntry;

    #[test]
    fn test_records() {
        let annotation = SentenceAnnotation {
            id: "7".into(),
            snt: "Won't!".into(),
            chart: vec![
                AnnotationEntry {
                    span: "0-2".into(),
                    kind: "DECONTRACTION".into(),
                    sem_class: None,
                    surf: "Will".into(),
                },
                AnnotationEntry {
                    span: "5-6".into(),
                    kind: "PUNCT".into(),
                    sem_class: Some("end".into()),
                    surf: "!".into(),
                },
            ],
        };
        let mut out = Vec::new();
        {
            let mut formatter = DoubleColonFormatter::new(&mut out);
            formatter.write_annotation(&annotation).unwrap();
            formatter.finish().unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "::line 7 ::s Won't!\n\
             ::span 0-2 ::type DECONTRACTION ::surf Will\n\
             ::span 5-6 ::type PUNCT ::sem-class end ::surf !\n"
        );
    }
}
