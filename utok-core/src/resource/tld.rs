//! Top-level domain codes grouped by how reliably they mark a domain name
//!
//! `com` almost always ends a domain name; `in` or `it` are also ordinary
//! words, so the URL pattern demands more evidence before trusting them.

use super::line::{is_blank, strip_comment, SlotLine, TLD_SCHEMA};
use super::LoadReport;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopLevelDomains {
    pub low: Vec<String>,
    pub normal: Vec<String>,
    pub high: Vec<String>,
}

impl TopLevelDomains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.normal.is_empty() && self.high.is_empty()
    }

    /// Load `::code xx ::reliability low|normal|high` lines
    ///
    /// Codes are stored lowercase; a missing or unknown reliability counts
    /// as normal.
    pub fn load_str(&mut self, text: &str, source: &str) -> LoadReport {
        let mut report = LoadReport::new(source);
        for (idx, raw) in text.lines().enumerate() {
            report.lines = idx + 1;
            let line = strip_comment(raw);
            if is_blank(line) {
                continue;
            }
            let problems = TLD_SCHEMA.validate(line);
            if !problems.is_empty() {
                report.warn(idx + 1, problems);
                continue;
            }
            let slots = SlotLine::parse(line);
            let Some(code) = slots.value("code") else {
                continue;
            };
            let code = code.to_lowercase();
            match slots.value("reliability") {
                Some("low") => self.low.push(code),
                Some("high") => self.high.push(code),
                _ => self.normal.push(code),
            }
            report.entries += 1;
        }
        for list in [&mut self.low, &mut self.normal, &mut self.high] {
            list.sort();
            list.dedup();
        }
        report.log_summary();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reliability_classes() {
        let mut tlds = TopLevelDomains::new();
        let report = tlds.load_str(
            "# domains\n\
             ::code COM ::reliability high\n\
             ::code uk ::country-name United Kingdom\n\
             ::code in ::reliability low ::country-name India\n\
             ::code de ::reliability normal\n\
             ::code xx ::color red\n",
            "tld-test",
        );
        assert_eq!(tlds.high, vec!["com"]);
        assert_eq!(tlds.normal, vec!["de", "uk"]);
        assert_eq!(tlds.low, vec!["in"]);
        assert_eq!(report.entries, 4);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line, 6);
    }
}
