//! Token spans over the original line

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Contiguous character range in the original line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SimpleSpan {
    pub hard_from: usize,
    pub hard_to: usize,
    pub soft_from: usize,
    pub soft_to: usize,
}

impl SimpleSpan {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            hard_from: from,
            hard_to: to,
            soft_from: from,
            soft_to: to,
        }
    }

    pub fn len(&self) -> usize {
        self.hard_to.saturating_sub(self.hard_from)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SimpleSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.hard_from, self.hard_to)
    }
}

/// One or more simple spans; discontinuous tokens carry several
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComplexSpan {
    spans: SmallVec<[SimpleSpan; 1]>,
}

impl ComplexSpan {
    pub fn new(spans: impl IntoIterator<Item = SimpleSpan>) -> Self {
        let mut spans: SmallVec<[SimpleSpan; 1]> = spans.into_iter().collect();
        spans.sort();
        Self { spans }
    }

    pub fn spans(&self) -> &[SimpleSpan] {
        &self.spans
    }

    /// Sort key: start and end of the first simple span
    pub fn sort_key(&self) -> (usize, usize) {
        self.spans
            .first()
            .map_or((0, 0), |span| (span.hard_from, span.hard_to))
    }
}

impl From<SimpleSpan> for ComplexSpan {
    fn from(span: SimpleSpan) -> Self {
        Self::new([span])
    }
}

impl fmt::Display for ComplexSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{span}")?;
        }
        Ok(())
    }
}
