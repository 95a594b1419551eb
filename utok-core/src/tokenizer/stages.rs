//! The ordered segmentation stages
//!
//! Every stage looks for one token in a byte range of the normalized line.
//! A stage that finds one hands it to [`Pass::carve`], which emits the token
//! and runs the pipeline again on the text to its left and right. A stage
//! that finds nothing passes the range on to the next stage; the last stage
//! splits on whitespace.

use super::context::{ends_with_letter, GeneralConditions};
use super::markup::decorate;
use super::patterns::{self as pat, find_group_guarded, find_guarded, is_match};
use super::Tokenizer;
use crate::charclass::{class_of, is_digit, is_letter, is_mark, CharClass};
use crate::chart::{Chart, Token, TokenType};
use crate::decontract::{map_contraction, Piece};
use crate::resource::{lower_char, lowercase, PrefixClass, RuleKind, SplitSide};
use std::ops::Range;

const DEPTH_ALERT: usize = 150;
const DEPTH_CAP: usize = 250;
const NUMBER_DEPTH_ALERT: usize = 100;
const NUMBER_DEPTH_CAP: usize = 200;
const SYMBOL_DEPTH_ALERT: usize = 100;
const SYMBOL_DEPTH_CAP: usize = 200;

/// Pipeline stages in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Stage {
    Xml,
    Url,
    Email,
    Filename,
    Symbol,
    HashtagHandle,
    AbbrevPattern,
    Resource,
    AbbrevInitials,
    AbbrevPeriods,
    Contractions,
    Numbers,
    Lexical,
    ComplexNames,
    MarkupPunct,
    Punct,
    PostPunct,
    Whitespace,
}

impl Stage {
    pub const FIRST: Stage = Stage::Xml;

    pub fn next(self) -> Option<Stage> {
        use Stage::*;
        Some(match self {
            Xml => Url,
            Url => Email,
            Email => Filename,
            Filename => Symbol,
            Symbol => HashtagHandle,
            HashtagHandle => AbbrevPattern,
            AbbrevPattern => Resource,
            Resource => AbbrevInitials,
            AbbrevInitials => AbbrevPeriods,
            AbbrevPeriods => Contractions,
            Contractions => Numbers,
            Numbers => Lexical,
            Lexical => ComplexNames,
            ComplexNames => MarkupPunct,
            MarkupPunct => Punct,
            Punct => PostPunct,
            PostPunct => Whitespace,
            Whitespace => return None,
        })
    }
}

/// A token found by a stage
#[derive(Debug, Clone)]
pub(crate) struct Match {
    /// Byte range in the normalized line
    range: Range<usize>,
    /// Output tokens with ranges relative to `range.start`; empty for the plain surface
    pieces: Vec<Piece>,
    kind: TokenType,
    sem_class: Option<String>,
    /// The text left of the token has passed all stages up to this one
    left_done: bool,
}

impl Match {
    fn new(range: Range<usize>, kind: TokenType) -> Self {
        Self {
            range,
            pieces: Vec::new(),
            kind,
            sem_class: None,
            left_done: false,
        }
    }

    fn sem_class(mut self, sem_class: Option<&String>) -> Self {
        self.sem_class = sem_class.cloned();
        self
    }

    fn left_done(mut self) -> Self {
        self.left_done = true;
        self
    }

    fn pieces(mut self, pieces: Vec<Piece>) -> Self {
        self.pieces = pieces;
        self
    }
}

/// Mutable state of one line's pass
#[derive(Debug, Default)]
pub(crate) struct PassState {
    pub chart: Option<Chart>,
    pub tokens: Vec<String>,
    depth: usize,
    number_depth: usize,
    symbol_depth: usize,
    depth_alerted: bool,
    depth_capped: bool,
    number_alerted: bool,
    number_capped: bool,
    symbol_alerted: bool,
    symbol_capped: bool,
}

impl PassState {
    pub fn new(chart: Option<Chart>) -> Self {
        Self {
            chart,
            ..Self::default()
        }
    }

    fn any_alert(&self) -> bool {
        self.depth_alerted || self.number_alerted || self.symbol_alerted
    }
}

/// Read-only context of one line's pass
pub(crate) struct Pass<'a> {
    pub tok: &'a Tokenizer,
    /// Normalized line
    pub line: &'a str,
    pub lv: CharClass,
    pub lang: Option<&'a str>,
    pub line_id: &'a str,
}

impl Pass<'_> {
    fn general(&self) -> GeneralConditions<'_> {
        GeneralConditions {
            lv: self.lv,
            detok: &self.tok.detok,
        }
    }

    fn has(&self, class: CharClass) -> bool {
        self.lv.intersects(class)
    }

    fn absolute(&self, range: &Range<usize>, local: Range<usize>) -> Range<usize> {
        range.start + local.start..range.start + local.end
    }

    /// Run the pipeline on `range`, starting at `stage`
    pub fn run(&self, st: &mut PassState, stage: Stage, range: Range<usize>) {
        let mut stage = stage;
        loop {
            if range.is_empty() {
                return;
            }
            let found = match stage {
                Stage::Whitespace => {
                    self.whitespace(st, range);
                    return;
                }
                Stage::Numbers => {
                    st.number_depth += 1;
                    let found = if self.number_depth_ok(st) {
                        self.numbers(&range)
                    } else {
                        None
                    };
                    if let Some(m) = found {
                        self.carve(st, stage, range, m);
                        st.number_depth -= 1;
                        return;
                    }
                    st.number_depth -= 1;
                    None
                }
                Stage::Symbol => {
                    st.symbol_depth += 1;
                    let found = if self.symbol_depth_ok(st) {
                        self.symbols(&range)
                    } else {
                        None
                    };
                    if let Some(m) = found {
                        self.carve(st, stage, range, m);
                        st.symbol_depth -= 1;
                        return;
                    }
                    st.symbol_depth -= 1;
                    None
                }
                _ => self.apply(stage, &range),
            };
            if let Some(m) = found {
                self.carve(st, stage, range, m);
                return;
            }
            stage = stage.next().unwrap_or(Stage::Whitespace);
        }
    }

    fn apply(&self, stage: Stage, range: &Range<usize>) -> Option<Match> {
        match stage {
            Stage::Xml => self.xml(range),
            Stage::Url => self.urls(range),
            Stage::Email => self.emails(range),
            Stage::Filename => self.filenames(range),
            Stage::HashtagHandle => self.hashtags_and_handles(range),
            Stage::AbbrevPattern => self.abbreviation_patterns(range),
            Stage::Resource => self.resource_entries(range),
            Stage::AbbrevInitials => self.abbreviation_initials(range),
            Stage::AbbrevPeriods => self.abbreviation_periods(range),
            Stage::Contractions => self.contractions(range),
            Stage::Lexical => self.lexical_entries(range),
            Stage::ComplexNames => self.complex_names(range),
            Stage::MarkupPunct => self.markup_punctuation(range),
            Stage::Punct => self.punctuation(range),
            Stage::PostPunct => self.post_punctuation(range),
            Stage::Numbers | Stage::Symbol | Stage::Whitespace => None,
        }
    }

    fn number_depth_ok(&self, st: &mut PassState) -> bool {
        if st.number_depth > NUMBER_DEPTH_CAP {
            if !st.number_capped {
                log::warn!(
                    "Exceeded number tokenization recursion depth of {NUMBER_DEPTH_CAP} in line {}. \
                     Will skip remaining number tokenization for this sentence.",
                    self.line_id
                );
                st.number_capped = true;
            }
            return false;
        }
        if st.number_depth > NUMBER_DEPTH_ALERT && !st.number_alerted {
            log::warn!(
                "Exceeded number tokenization recursion depth of {NUMBER_DEPTH_ALERT} in line {} \
                 ({} characters, {} digits)",
                self.line_id,
                self.line.chars().count(),
                self.line.chars().filter(|&c| is_digit(c)).count()
            );
            st.number_alerted = true;
        }
        true
    }

    fn symbol_depth_ok(&self, st: &mut PassState) -> bool {
        if st.symbol_depth > SYMBOL_DEPTH_CAP {
            if !st.symbol_capped {
                log::warn!(
                    "Exceeded symbol tokenization recursion depth of {SYMBOL_DEPTH_CAP} in line {}. \
                     Will skip remaining symbol tokenization for this sentence.",
                    self.line_id
                );
                st.symbol_capped = true;
            }
            return false;
        }
        if st.symbol_depth > SYMBOL_DEPTH_ALERT && !st.symbol_alerted {
            log::warn!(
                "Exceeded symbol tokenization recursion depth of {SYMBOL_DEPTH_ALERT} in line {} \
                 ({} characters)",
                self.line_id,
                self.line.chars().count()
            );
            st.symbol_alerted = true;
        }
        true
    }

    /// Emit the token(s) of `m` and segment the text around them
    fn carve(&self, st: &mut PassState, stage: Stage, segment: Range<usize>, m: Match) {
        st.depth += 1;
        if st.depth > DEPTH_CAP {
            if !st.depth_capped {
                log::warn!(
                    "Exceeded general tokenization recursion depth of {DEPTH_CAP} in line {}. \
                     Will skip remaining tokenization steps for this sentence.",
                    self.line_id
                );
                st.depth_capped = true;
            }
            self.whitespace(st, segment);
            st.depth -= 1;
            return;
        }
        if st.depth > DEPTH_ALERT && !st.any_alert() {
            log::warn!(
                "Exceeded general tokenization recursion depth of {DEPTH_ALERT} in line {} \
                 ({} characters, {} words)",
                self.line_id,
                self.line.chars().count(),
                self.line.split_whitespace().count()
            );
            st.depth_alerted = true;
        }

        let pieces: Vec<(Range<usize>, String)> = if m.pieces.is_empty() {
            vec![(m.range.clone(), self.line[m.range.clone()].to_string())]
        } else {
            m.pieces
                .iter()
                .map(|piece| (self.absolute(&m.range, piece.range.clone()), piece.surface.clone()))
                .collect()
        };

        let mut position = segment.start;
        for (i, (range, surface)) in pieces.into_iter().enumerate() {
            if range.start > position {
                let next = if i == 0 && m.left_done {
                    stage.next().unwrap_or(Stage::Whitespace)
                } else {
                    Stage::FIRST
                };
                self.run(st, next, position..range.start);
            }
            self.emit(st, range.clone(), surface, m.kind.clone(), m.sem_class.clone());
            position = range.end;
        }
        if position < segment.end {
            self.run(st, Stage::FIRST, position..segment.end);
        }
        st.depth -= 1;
    }

    fn emit(&self, st: &mut PassState, range: Range<usize>, surface: String, kind: TokenType, sem_class: Option<String>) {
        let surface = if self.tok.config.simple {
            surface
        } else {
            decorate(
                &self.tok.detok,
                &surface,
                &self.line[..range.start],
                &self.line[range.end..],
                self.lang,
            )
        };
        if let Some(chart) = st.chart.as_mut() {
            let span = chart.span(range.start, range.end);
            chart.register(Token {
                surface: surface.clone(),
                original_surface: self.line[range].to_string(),
                kind,
                sem_class,
                span: span.into(),
            });
        }
        st.tokens.push(surface);
    }

    /// Final stage: split on whitespace
    fn whitespace(&self, st: &mut PassState, range: Range<usize>) {
        let s = &self.line[range.clone()];
        let mut start = None;
        for (i, c) in s.char_indices().chain(std::iter::once((s.len(), ' '))) {
            if c.is_whitespace() {
                if let Some(a) = start.take() {
                    let word = self.absolute(&range, a..i);
                    let surface = self.line[word.clone()].to_string();
                    let kind = basic_token_type(&surface);
                    self.emit(st, word, surface, kind, None);
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
    }

    fn found(&self, range: &Range<usize>, local: Option<Range<usize>>, kind: TokenType) -> Option<Match> {
        local.map(|local| Match::new(self.absolute(range, local), kind))
    }

    fn xml(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if self.has(CharClass::LESS_THAN) {
            if let Some(m) = self.found(range, find_guarded(&pat::XML, s, |_| true), TokenType::Xml) {
                return Some(m);
            }
        }
        if self.has(CharClass::LEFT_SQUARE_BRACKET) {
            return self.found(range, find_guarded(&pat::BBCODE, s, |_| true), TokenType::BbCode);
        }
        None
    }

    fn urls(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if !is_match(&pat::DOT_AB, s) {
            return None;
        }
        let local = find_guarded(&pat::URL_SCHEME, s, |_| true).or_else(|| {
            self.tok
                .patterns
                .domain_url
                .as_ref()
                .and_then(|re| find_guarded(re, s, pat::domain_url_may_follow))
        });
        self.found(range, local, TokenType::Url)
    }

    fn emails(&self, range: &Range<usize>) -> Option<Match> {
        if !self.has(CharClass::AT_SIGN) {
            return None;
        }
        let s = &self.line[range.clone()];
        self.found(range, find_guarded(&pat::EMAIL, s, pat::email_may_follow), TokenType::EmailAddress)
    }

    fn filenames(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if is_match(&pat::DOT_AB, s) {
            if let Some(m) = self.found(
                range,
                find_guarded(&pat::FILENAME, s, pat::filename_may_follow),
                TokenType::Filename,
            ) {
                return Some(m);
            }
        }
        if self.has(CharClass::SLASH) {
            return self.found(
                range,
                find_guarded(&pat::ABS_FILENAME, s, pat::filename_may_follow),
                TokenType::Filename,
            );
        }
        None
    }

    /// Runs of pictographs and dingbats, unless vetoed by a non-symbol entry
    fn symbols(&self, range: &Range<usize>) -> Option<Match> {
        if !self.has(CharClass::MISC_SYMBOL) {
            return None;
        }
        let s = &self.line[range.clone()];
        let mut start = None;
        for (i, c) in s.char_indices().chain(std::iter::once((s.len(), ' '))) {
            let class = if i < s.len() { class_of(c) } else { CharClass::NONE };
            if class.intersects(CharClass::MISC_SYMBOL) {
                start.get_or_insert(i);
            } else if class.intersects(CharClass::VARIATION_SELECTOR) {
                continue;
            } else if let Some(a) = start.take() {
                let local = a..i;
                if self.is_valid_symbol(range, local.clone()) {
                    return Some(Match::new(self.absolute(range, local), TokenType::Symbol).left_done());
                }
            }
        }
        None
    }

    fn is_valid_symbol(&self, range: &Range<usize>, local: Range<usize>) -> bool {
        let abs = self.absolute(range, local);
        let candidate = &self.line[abs.clone()];
        !self
            .tok
            .store
            .entries(&lowercase(candidate))
            .iter()
            .any(|entry| {
                matches!(entry.kind, RuleKind::NonSymbol)
                    && entry.admits(candidate, &self.line[..abs.start], &self.line[abs.end..], self.lang)
            })
    }

    fn hashtags_and_handles(&self, range: &Range<usize>) -> Option<Match> {
        if !self.has(CharClass::NUMBER_SIGN | CharClass::AT_SIGN) {
            return None;
        }
        let s = &self.line[range.clone()];
        let local = find_guarded(&pat::HASHTAG_OR_HANDLE, s, pat::hashtag_may_follow)?;
        let kind = if s[local.clone()].starts_with('#') {
            TokenType::Hashtag
        } else {
            TokenType::Handle
        };
        self.found(range, Some(local), kind)
    }

    /// Product names such as `F-15B`, and phonetically spelled initials
    fn abbreviation_patterns(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if self.has(CharClass::DASH) {
            if let Some(m) = self.found(
                range,
                find_guarded(&pat::ABBREV_PRODUCT, s, pat::abbrev_product_may_follow),
                TokenType::AbbrevPattern,
            ) {
                return Some(m);
            }
        }
        self.tok.patterns.phonetics(self.lang).iter().find_map(|phonetic| {
            self.found(
                range,
                find_group_guarded(&phonetic.re, 1, s, pat::phonetic_may_follow),
                TokenType::AbbrevPhonetic,
            )
        })
    }

    /// Abbreviations, contractions, repairs and priority lexical items from the resources
    fn resource_entries(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        let scan = Scan::new(s, true);
        let general = self.general();
        let mut last_class = CharClass::NONE;

        for i in 0..scan.chars.len() {
            let class = class_of(scan.chars[i]);
            if scan.skip(i, class, last_class) {
                continue;
            }
            let left = &s[..scan.bounds[i]];
            for (end, entries) in self.tok.store.candidates(PrefixClass::Main, &scan.keys, i) {
                let local = scan.bounds[i]..scan.bounds[end];
                let candidate = &s[local.clone()];
                let right = &s[local.end..];
                if !general.admit(candidate, left, right) {
                    continue;
                }
                let abs = self.absolute(range, local.clone());
                let (full_left, full_right) = (&self.line[..abs.start], &self.line[abs.end..]);
                for entry in entries {
                    if !entry.admits(candidate, full_left, full_right, self.lang) {
                        continue;
                    }
                    let found = match &entry.kind {
                        RuleKind::Abbreviation { .. } => general
                            .admit_abbreviation(candidate, left, right, entry)
                            .then(|| Match::new(abs.clone(), TokenType::Abbrev)),
                        RuleKind::LexicalPriority => {
                            let kind = if entry.sem_class.as_deref() == Some("url") {
                                TokenType::UrlLexical
                            } else {
                                TokenType::LexicalPriority
                            };
                            Some(Match::new(abs.clone(), kind))
                        }
                        RuleKind::Contraction { target, char_splits } => Some(
                            Match::new(abs.clone(), TokenType::Decontraction).pieces(map_contraction(
                                candidate,
                                &entry.surface,
                                target,
                                char_splits.as_deref(),
                            )),
                        ),
                        RuleKind::Repair { target } => Some(
                            Match::new(abs.clone(), TokenType::Repair)
                                .pieces(map_contraction(candidate, &entry.surface, target, None)),
                        ),
                        _ => None,
                    };
                    if let Some(m) = found {
                        return Some(m.sem_class(entry.sem_class.as_ref()).left_done());
                    }
                }
            }
            last_class = class;
        }
        None
    }

    /// Initials such as the `J.` of `J. F. Kennedy` or `J.F.Kennedy`
    fn abbreviation_initials(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if !is_match(&pat::CAP_INITIAL, s) {
            return None;
        }
        let chars: Vec<(usize, char)> = s.char_indices().collect();
        for (k, window) in chars.windows(2).enumerate() {
            let [(i, c), (j, next)] = [window[0], window[1]];
            if !(is_letter(c) && c.is_uppercase() && next == '.') {
                continue;
            }
            if k > 0 && is_letter(chars[k - 1].1) {
                continue;
            }
            let end = j + next.len_utf8();
            if is_match(&pat::INITIAL_RIGHT_CONTEXT, &s[end..]) {
                return self.found(range, Some(i..end), TokenType::AbbrevInitial);
            }
        }
        None
    }

    /// Acronyms with periods such as `B.A.T.`
    fn abbreviation_periods(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if !is_match(&pat::LETTER, s) {
            return None;
        }
        self.found(
            range,
            find_guarded(&pat::ABBREV_PERIODS, s, pat::abbrev_periods_may_follow),
            TokenType::AbbrevPeriods,
        )
    }

    /// Greek elisions and English clitics such as the `'s` of `John's`
    fn contractions(&self, range: &Range<usize>) -> Option<Match> {
        if !self.has(CharClass::APOSTROPHE) {
            return None;
        }
        let s = &self.line[range.clone()];
        if matches!(self.lang, Some("ell" | "grc" | "ecg")) {
            if let Some(m) = self.found(
                range,
                find_guarded(&pat::GREEK_CONTRACTION, s, pat::greek_contraction_may_follow),
                TokenType::Decontraction,
            ) {
                return Some(m);
            }
        }
        self.found(
            range,
            find_guarded(&pat::ENGLISH_CLITIC, s, pat::english_clitic_may_follow),
            TokenType::Decontraction,
        )
    }

    fn numbers(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if self.has(CharClass::ETHIOPIC_NUMBER) {
            if let Some(m) = self.found(
                range,
                find_guarded(&pat::ETHIOPIC_NUMBER, s, |_| true),
                TokenType::NumberEthiopic,
            ) {
                return Some(m);
            }
        }
        if !self.has(CharClass::DIGIT) {
            return None;
        }
        let decimal_comma = !self.lang.is_some_and(|lang| pat::NO_DECIMAL_COMMA.contains(&lang));
        let local = find_guarded(&pat::NUMBER, s, pat::number_may_follow)
            .or_else(|| {
                decimal_comma
                    .then(|| find_guarded(&pat::NUMBER_DECIMAL_COMMA, s, pat::decimal_comma_number_may_follow))
                    .flatten()
            })
            .or_else(|| find_guarded(&pat::INTEGER, s, pat::integer_may_follow))?;
        let mut abs = self.absolute(range, local);
        // a sign after a number, letter or period is a range dash or an operator
        if let Some(sign) = self.line[abs.clone()]
            .chars()
            .next()
            .filter(|c| matches!(c, '-' | '−' | '–' | '+'))
        {
            let left = &self.line[..abs.start];
            let ends_with_amount = super::context::ends_with_digit(left)
                || left
                    .strip_suffix(|c: char| c == '%' || c == '\'')
                    .is_some_and(super::context::ends_with_digit);
            if ends_with_amount || ends_with_letter(left) || left.ends_with('.') {
                abs.start += sign.len_utf8();
            }
        }
        Some(Match::new(abs, TokenType::Number))
    }

    /// Lexical items from the resources, typed by their `::tag`
    fn lexical_entries(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        let scan = Scan::new(s, true);
        let general = self.general();
        let mut last_class = CharClass::NONE;

        for i in 0..scan.chars.len() {
            let class = class_of(scan.chars[i]);
            if scan.skip(i, class, last_class) {
                continue;
            }
            let left = &s[..scan.bounds[i]];
            for (end, entries) in self.tok.store.candidates(PrefixClass::Lexical, &scan.keys, i) {
                let local = scan.bounds[i]..scan.bounds[end];
                let candidate = &s[local.clone()];
                let right = &s[local.end..];
                if !general.admit(candidate, left, right) {
                    continue;
                }
                let abs = self.absolute(range, local.clone());
                let (full_left, full_right) = (&self.line[..abs.start], &self.line[abs.end..]);
                let entry = entries.iter().find(|entry| {
                    matches!(entry.kind, RuleKind::Lexical)
                        && entry.admits(candidate, full_left, full_right, self.lang)
                        && general.admit_lexical(candidate, left, right, entry)
                });
                if let Some(entry) = entry {
                    let kind = entry
                        .tag
                        .as_ref()
                        .map_or(TokenType::Lexical, |tag| TokenType::Tag(tag.clone()));
                    return Some(
                        Match::new(abs, kind)
                            .sem_class(entry.sem_class.as_ref())
                            .left_done(),
                    );
                }
            }
            last_class = class;
        }
        None
    }

    /// Multi-dash names such as `Saint-Jean-de-Luz`
    fn complex_names(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if !(self.has(CharClass::DASH) && is_match(&pat::DASH_LETTERS_DASH, s)) {
            return None;
        }
        self.found(
            range,
            find_guarded(&pat::MULTI_DASH_NAME, s, pat::multi_dash_name_may_follow),
            TokenType::LexicalName,
        )
    }

    /// Already decorated markup such as `@-@`, and dashes between words or numbers
    fn markup_punctuation(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        if self.has(CharClass::ATTACH_TAG) {
            let mut start = None;
            for (i, c) in s.char_indices().chain(std::iter::once((s.len(), ' '))) {
                if c.is_whitespace() {
                    if let Some(a) = start.take() {
                        if self.tok.detok.is_markup_token(&s[a..i]) {
                            return self.found(range, Some(a..i), TokenType::PunctMarkup);
                        }
                    }
                } else if start.is_none() {
                    start = Some(i);
                }
            }
        }
        self.found(
            range,
            find_group_guarded(&pat::INFIX_DASH, 1, s, |_| true),
            TokenType::Dash,
        )
    }

    /// Punctuation split according to the `::punct-split` entries
    fn punctuation(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        let scan = Scan::new(s, false);
        let general = self.general();
        let n = scan.chars.len();

        for i in 0..n {
            let left = &s[..scan.bounds[i]];
            for (end, entries) in self.tok.store.candidates(PrefixClass::Punct, &scan.keys, i) {
                let candidate = &s[scan.bounds[i]..scan.bounds[end]];
                if !general.admit(candidate, left, &s[scan.bounds[end]..]) {
                    continue;
                }
                for entry in entries {
                    let RuleKind::PunctSplit { side, group } = entry.kind else {
                        continue;
                    };
                    let mut end2 = end;
                    if group {
                        while end2 < n && scan.chars[end2 - 1] == scan.chars[end2] {
                            end2 += 1;
                        }
                    }
                    let local = scan.bounds[i]..scan.bounds[end2];
                    let abs = self.absolute(range, local.clone());
                    let token = &s[local];
                    if !entry.admits(token, &self.line[..abs.start], &self.line[abs.end..], self.lang) {
                        continue;
                    }
                    let kind = match side {
                        SplitSide::Both => TokenType::Punct,
                        SplitSide::Start if i == 0 || scan.chars[i - 1].is_whitespace() => TokenType::PunctStart,
                        SplitSide::End if end2 == n || scan.chars[end2].is_whitespace() => TokenType::PunctEnd,
                        _ => continue,
                    };
                    return Some(Match::new(abs, kind).sem_class(entry.sem_class.as_ref()));
                }
            }
        }
        None
    }

    /// Integers glued to a following word, e.g. `5weeks`
    fn post_punctuation(&self, range: &Range<usize>) -> Option<Match> {
        let s = &self.line[range.clone()];
        self.found(
            range,
            find_guarded(&pat::LEADING_INTEGER, s, pat::leading_integer_may_follow),
            TokenType::NumberPrefix,
        )
    }
}

/// Characters of a segment prepared for prefix-trie lookup
struct Scan {
    chars: Vec<char>,
    /// Lookup keys, lowercased unless scanning punctuation
    keys: Vec<char>,
    /// Byte offset of every character, plus the segment length
    bounds: Vec<usize>,
}

impl Scan {
    fn new(s: &str, lowercase: bool) -> Self {
        let chars: Vec<char> = s.chars().collect();
        let keys = if lowercase {
            chars.iter().map(|&c| lower_char(c)).collect()
        } else {
            chars.clone()
        };
        let bounds = s
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(s.len()))
            .collect();
        Self { chars, keys, bounds }
    }

    /// Tokens do not start on a mark, inside a word or inside a number
    fn skip(&self, i: usize, class: CharClass, last_class: CharClass) -> bool {
        is_mark(self.chars[i])
            || (last_class.intersects(CharClass::ALPHA) && class.intersects(CharClass::ALPHA))
            || (last_class.intersects(CharClass::DIGIT) && class.intersects(CharClass::DIGIT))
    }
}

/// Type of a token produced by the whitespace stage
fn basic_token_type(token: &str) -> TokenType {
    if token.chars().any(is_letter) {
        TokenType::WordBasic
    } else if token.chars().any(char::is_numeric) {
        TokenType::NumberBasic
    } else if pat::SYMBOL_CHAR.is_match(token) {
        TokenType::SymbolBasic
    } else if pat::PUNCT_CHAR.is_match(token) {
        TokenType::PunctBasic
    } else {
        TokenType::MiscBasic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::FIRST;
        let mut count = 1;
        while let Some(next) = stage.next() {
            stage = next;
            count += 1;
        }
        assert_eq!(stage, Stage::Whitespace);
        assert_eq!(count, 18);
        assert_eq!(Stage::Resource.next(), Some(Stage::AbbrevInitials));
    }

    #[test]
    fn test_basic_token_type() {
        assert_eq!(basic_token_type("word"), TokenType::WordBasic);
        assert_eq!(basic_token_type("42"), TokenType::NumberBasic);
        assert_eq!(basic_token_type("€"), TokenType::SymbolBasic);
        assert_eq!(basic_token_type("@-@"), TokenType::PunctBasic);
        assert_eq!(basic_token_type("\u{200B}"), TokenType::MiscBasic);
    }

    #[test]
    fn test_scan_skips_word_interiors() {
        let scan = Scan::new("ab1é", true);
        assert!(!scan.skip(0, class_of('a'), CharClass::NONE));
        assert!(scan.skip(1, class_of('b'), class_of('a')));
        assert!(!scan.skip(2, class_of('1'), class_of('b')));
        assert_eq!(scan.bounds, vec![0, 1, 2, 3, 5]);
    }
}
