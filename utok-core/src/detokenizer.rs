//! Detokenizer: rejoins tokenized text
//!
//! Decides for every pair of adjacent tokens whether they are separated by
//! a space, re-fuses decontracted words such as `do n't`, and strips the
//! attach tag from markup tokens such as `@-@`.

use crate::charclass::{is_letter, is_mark};
use crate::config::DetokenizerConfig;
use crate::decontract::adjust_capitalization;
use crate::error::{ConfigError, Result};
use crate::resource::{DetokRules, LoadReport, ResourceLoader};
use regex::Regex;
use std::sync::LazyLock;

static RE_LINE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)(\s+)(\S|\S.*\S)\s*$").unwrap());
static RE_CLOSE_XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^</[a-z][-_a-z0-9]*>").unwrap());
static RE_ENDS_WITH_OPEN_XML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<[a-z][-_:a-z0-9]*(?:\s+[a-z][-_:a-z0-9]*="[^"]*")*\s*>$"#).unwrap()
});
static RE_CLOSE_BBCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[/(?:QUOTE|IMG|INDENT|URL|B|I|COLOR|CENTER|SIZE)\]$").unwrap()
});
static RE_ENDS_WITH_OPEN_BBCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\[(?:QUOTE|URL|COLOR|SIZE)=[^\t\n\[\]]+\]|\[(?:QUOTE|IMG|INDENT|URL|B|I|COLOR|CENTER|SIZE)\])$",
    )
    .unwrap()
});
static RE_NAME_INITIAL_OR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Lu}\pM*(?:\.|\p{Ll}.*)$").unwrap());

/// Languages whose name initials attach to the following name
const NAME_INITIAL_LANGUAGES: &[&str] = &["kaz"];

/// Rule-driven detokenizer
#[derive(Debug)]
pub struct Detokenizer {
    config: DetokenizerConfig,
    rules: DetokRules,
    /// An XML tag, possibly containing spaces, as one token
    xml_tag_re: Regex,
    reports: Vec<LoadReport>,
}

impl Detokenizer {
    /// Load the rule resources selected by `config`
    pub fn new(config: DetokenizerConfig) -> Result<Self> {
        config.validate()?;
        let source = config.resource_source();
        let langs = &config.languages;
        let mut rules = DetokRules::new();

        let mut loader = ResourceLoader::new(&source);
        loader.load("detok-resource.txt", |text, name| rules.load_str(text, name, langs))?;
        for lang in langs {
            loader.load_language(lang, |text, name| rules.load_str(text, name, langs))?;
        }
        loader.load("tok-resource.txt", |text, name| rules.load_str(text, name, langs))?;
        if !langs.iter().any(|lang| lang == "eng-global") {
            loader.load("tok-resource-eng-global.txt", |text, name| {
                rules.load_str(text, name, langs)
            })?;
        }
        let reports = loader.finish()?;

        if let Some(tag) = config.attach_tag {
            rules.set_attach_tag(tag);
        }
        let tag = regex::escape(&rules.attach_tag().to_string());
        let xml_tag_re = Regex::new(&format!(r"^(\s*)({tag}?</?[a-zA-Z][^<>]*>{tag}?)(\s.*|)$"))
            .map_err(|e| ConfigError::Invalid(format!("attach tag yields no XML tag pattern: {e}")))?;

        Ok(Self {
            config,
            rules,
            xml_tag_re,
            reports,
        })
    }

    pub fn config(&self) -> &DetokenizerConfig {
        &self.config
    }

    /// Reports of all loaded resource files
    pub fn load_reports(&self) -> &[LoadReport] {
        &self.reports
    }

    /// Split tokenized text into tokens with their byte offsets
    fn tokens(&self, s: &str) -> Vec<(usize, String)> {
        let may_contain_xml = s.contains('<');
        let mut tokens = Vec::new();
        let mut offset = 0;
        let mut rest = s;
        loop {
            if may_contain_xml {
                if let Some(caps) = self.xml_tag_re.captures(rest) {
                    let (space, tag) = (caps[1].len(), &caps[2]);
                    tokens.push((offset + space, tag.to_string()));
                    let consumed = space + tag.len();
                    offset += consumed;
                    rest = &rest[consumed..];
                    continue;
                }
            }
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                return tokens;
            }
            let start = offset + rest.len() - trimmed.len();
            let len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            tokens.push((start, trimmed[..len].to_string()));
            offset = start + len;
            rest = &trimmed[len..];
        }
    }

    /// Contraction of the space-joined `window`, adjusted to its capitalization
    fn contraction(&self, window: &[(usize, String)], lang: Option<&str>) -> Option<String> {
        let joined = window
            .iter()
            .map(|(_, token)| token.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        self.rules
            .contractions(&crate::resource::lowercase(&joined))
            .iter()
            .find(|rule| rule.rule.admits(&joined, "", "", lang, false))
            .map(|rule| adjust_capitalization(&rule.contraction, &joined))
    }

    /// Detokenize one line in the primary language
    pub fn detokenize(&self, s: &str) -> String {
        self.detokenize_in(s, self.config.primary_language())
    }

    /// Detokenize one line in language `lang`
    pub fn detokenize_in(&self, s: &str, lang: Option<&str>) -> String {
        let s = s.trim();
        if s.is_empty() {
            return String::new();
        }
        let tag = self.rules.attach_tag();
        let mut tokens = self.tokens(s);
        let mut result = String::with_capacity(s.len());
        let mut eliminate_space = true;

        let mut i = 0;
        while i < tokens.len() {
            // three-token contractions before two-token ones, e.g. "jusque à le"
            let fused = [3, 2]
                .into_iter()
                .filter(|width| i + width <= tokens.len())
                .find_map(|width| {
                    self.contraction(&tokens[i..i + width], lang)
                        .map(|contraction| (width, contraction))
                });
            if let Some((width, contraction)) = fused {
                let offset = tokens[i].0;
                tokens.splice(i..i + width, [(offset, contraction)]);
                continue;
            }

            let token = tokens[i].1.as_str();
            let prev = if i > 0 { tokens[i - 1].1.as_str() } else { "" };
            let next = tokens.get(i + 1).map_or("", |(_, t)| t.as_str());
            let right_context = tokens.get(i + 1).map_or("", |(offset, _)| &s[*offset..]);
            let marked_up = self.rules.is_markup_token(token);

            let attach = eliminate_space
                || (marked_up && token.starts_with(tag))
                || self.rules.attaches_left(token, &result, right_context, lang)
                || RE_CLOSE_XML_TAG.is_match(token)
                || RE_ENDS_WITH_OPEN_XML_TAG.is_match(&result)
                || RE_CLOSE_BBCODE.is_match(token)
                || RE_ENDS_WITH_OPEN_BBCODE.is_match(&result)
                || is_name_initial_to_attach(token, &result, lang);
            if !attach {
                result.push(' ');
            }
            if marked_up {
                result.push_str(token.trim_matches(tag));
            } else {
                result.push_str(token);
            }
            eliminate_space = (marked_up && token.ends_with(tag))
                || self.rules.attaches_right(token, prev, next, lang);
            i += 1;
        }
        result
    }

    /// Detokenize one input line, echoing a leading line id if configured
    pub fn process_line(&self, line: &str) -> String {
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if self.config.first_token_is_line_id {
            if let Some(caps) = RE_LINE_ID.captures(line) {
                return format!("{}{}{}", &caps[1], &caps[2], self.detokenize(&caps[3]));
            }
        }
        self.detokenize(line)
    }

    /// Detokenize a batch of lines, in order
    #[cfg(feature = "parallel")]
    pub fn process_lines(&self, lines: &[String]) -> Vec<String> {
        use rayon::prelude::*;
        lines.par_iter().map(|line| self.process_line(line)).collect()
    }

    /// Detokenize a batch of lines, in order
    #[cfg(not(feature = "parallel"))]
    pub fn process_lines(&self, lines: &[String]) -> Vec<String> {
        lines.iter().map(|line| self.process_line(line)).collect()
    }
}

/// Kazakh-style name initials: `А.` attaches to a following initial or name
fn is_name_initial_to_attach(token: &str, left: &str, lang: Option<&str>) -> bool {
    lang.is_some_and(|lang| NAME_INITIAL_LANGUAGES.contains(&lang))
        && RE_NAME_INITIAL_OR_NAME.is_match(token)
        && ends_with_name_initial(left)
}

/// True if `s` ends with a single capital letter and a period
fn ends_with_name_initial(s: &str) -> bool {
    let Some(rest) = s.strip_suffix('.') else {
        return false;
    };
    let mut chars = rest.chars().rev();
    match chars.next() {
        Some(initial) if initial.is_uppercase() && is_letter(initial) => {
            chars.next().map_or(true, |c| !is_letter(c) && !is_mark(c))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detokenizer(langs: &str) -> Detokenizer {
        let config = DetokenizerConfig::builder().languages(langs).build().unwrap();
        Detokenizer::new(config).unwrap()
    }

    #[test]
    fn test_contraction_and_punctuation() {
        let detok = detokenizer("eng");
        assert_eq!(detok.detokenize("Do n't worry !"), "Don't worry!");
        assert_eq!(detok.detokenize("Will n't he ?"), "Won't he?");
        assert_eq!(detok.detokenize("Sold , for $ 9,999.99 on ebay.com ."), "Sold, for $9,999.99 on ebay.com.");
    }

    #[test]
    fn test_markup_tokens() {
        let detok = detokenizer("eng");
        assert_eq!(detok.detokenize("a well @-@ known fact"), "a well-known fact");
        assert_eq!(detok.detokenize("He said \"@ Hello @\" ."), "He said \"Hello\".");
        assert_eq!(detok.detokenize("a '@ quote @' and 4 @+@ 5"), "a 'quote' and 4+5");
    }

    #[test]
    fn test_three_token_contraction() {
        let detok = detokenizer("fra");
        assert_eq!(detok.detokenize("jusque à le bout"), "jusqu'au bout");
        assert_eq!(detok.detokenize("Il parle de le chat"), "Il parle du chat");
    }

    #[test]
    fn test_xml_tags() {
        let detok = detokenizer("eng");
        assert_eq!(detok.detokenize("<a href=\"x y\"> link </a> ."), "<a href=\"x y\">link</a>.");
    }

    #[test]
    fn test_bbcode_tags() {
        let detok = detokenizer("eng");
        assert_eq!(detok.detokenize("a [b] bold [/b] word"), "a [b]bold[/b] word");
        assert_eq!(detok.detokenize("[URL=https://example.org] here [/URL]"), "[URL=https://example.org]here[/URL]");
    }

    #[test]
    fn test_currency_sign_sides() {
        let detok = detokenizer("eng");
        assert_eq!(detok.detokenize("for $ 10 only"), "for $10 only");
        assert_eq!(detok.detokenize("5 $ - cheap"), "5$ - cheap");
    }

    #[test]
    fn test_tokens_with_offsets() {
        let detok = detokenizer("eng");
        let tokens = detok.tokens("a  <b class=\"x\">  c");
        assert_eq!(
            tokens,
            vec![(0, "a".to_string()), (3, "<b class=\"x\">".to_string()), (18, "c".to_string())]
        );
    }

    #[test]
    fn test_name_initials() {
        assert!(ends_with_name_initial("Б."));
        assert!(ends_with_name_initial("x Б."));
        assert!(!ends_with_name_initial("АБ."));
        assert!(is_name_initial_to_attach("Абай", "Қ.", Some("kaz")));
        assert!(!is_name_initial_to_attach("Абай", "Қ.", Some("eng")));
    }

    #[test]
    fn test_line_id_and_blank_lines() {
        let config = DetokenizerConfig::builder()
            .languages("eng")
            .first_token_is_line_id(true)
            .build()
            .unwrap();
        let detok = Detokenizer::new(config).unwrap();
        assert_eq!(detok.process_line("s7 Hello , world .\n"), "s7 Hello, world.");
        assert_eq!(detok.process_line("   \n"), "");
    }
}
