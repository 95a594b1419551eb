//! End-to-end tokenization and detokenization with the embedded resources

use utok_core::{Detokenizer, DetokenizerConfig, TokenType, Tokenizer, TokenizerConfig};

fn tokenizer(langs: &str) -> Tokenizer {
    let config = TokenizerConfig::builder()
        .languages(langs)
        .chart(true)
        .build()
        .unwrap();
    Tokenizer::new(config).unwrap()
}

fn detokenizer(langs: &str) -> Detokenizer {
    let config = DetokenizerConfig::builder().languages(langs).build().unwrap();
    Detokenizer::new(config).unwrap()
}

fn kinds(tok: &Tokenizer, line: &str) -> Vec<(String, String)> {
    tok.tokenize_line(line, "1")
        .chart
        .unwrap()
        .tokens()
        .iter()
        .map(|t| (t.surface.clone(), t.kind.to_string()))
        .collect()
}

#[test]
fn test_price_and_domain() {
    let tok = tokenizer("eng");
    assert_eq!(
        tok.tokenize("Sold,for $9,999.99 on ebay.com."),
        "Sold , for $ 9,999.99 on ebay.com ."
    );
    let kinds = kinds(&tok, "Sold,for $9,999.99 on ebay.com.");
    assert!(kinds.contains(&("9,999.99".into(), "NUMBER".into())));
}

#[test]
fn test_abbreviations_keep_their_periods() {
    let tok = tokenizer("eng");
    assert_eq!(tok.tokenize("Dr. Smith lives in the U.S."), "Dr. Smith lives in the U.S.");
    assert_eq!(tok.tokenize("He left at 5 p.m. today."), "He left at 5 p.m. today .");
    assert_eq!(tok.tokenize("I like cats, e.g. Tom."), "I like cats , e.g. Tom .");
}

#[test]
fn test_decontraction_spans() {
    let tok = tokenizer("eng");
    let line = tok.tokenize_line("Won't stop", "9");
    assert_eq!(line.text, "Will n't stop");
    let chart = line.chart.unwrap();
    let spans: Vec<String> = chart.tokens().iter().map(|t| t.span.to_string()).collect();
    assert_eq!(spans, vec!["0-2", "2-5", "6-10"]);
    assert_eq!(chart.tokens()[0].kind, TokenType::Decontraction);
}

#[test]
fn test_number_sign_after_number() {
    let tok = tokenizer("eng");
    assert_eq!(tok.tokenize("Temperatures of -5 degrees"), "Temperatures of -5 degrees");
    assert_eq!(tok.tokenize("pages 10-12"), "pages 10 @-@ 12");
}

#[test]
fn test_lexical_items_survive_punctuation() {
    let tok = tokenizer("eng");
    assert_eq!(tok.tokenize("I code in C++ and C#."), "I code in C++ and C# .");
    assert_eq!(tok.tokenize("Use Wi-Fi or WiFi"), "Use Wi-Fi or WiFi");
}

#[test]
fn test_french_elision_and_contraction() {
    let tok = tokenizer("fra");
    let detok = detokenizer("fra");
    let tokens = tok.tokenize("Il va au marché.");
    assert_eq!(tokens, "Il va à le marché .");
    assert_eq!(detok.detokenize(&tokens), "Il va au marché.");
}

#[test]
fn test_symbols_split_from_words() {
    let tok = tokenizer("eng");
    assert_eq!(tok.tokenize("great😀😀 idea"), "great 😀😀 idea");
    let kinds = kinds(&tok, "great😀😀 idea");
    assert!(kinds.contains(&("😀😀".into(), "SYMBOL".into())));
}

#[test]
fn test_quote_plus_and_emoticon_tokens() {
    let tok = tokenizer("eng");
    assert!(tok.tokenize("She's 'quoted' here").contains(" '@ quoted @' "));
    assert!(tok.tokenize("That is 4+5.").contains(" 4 @+@ 5"));
    assert_eq!(tok.tokenize("a + b"), "a + b");
    assert!(tok.tokenize("@handle :) ok").ends_with(" :) ok"));
    let kinds = kinds(&tok, "so :) ok");
    assert!(kinds.contains(&(":)".into(), "EMOTICON".into())));
}

#[test]
fn test_round_trip_corpus() {
    let tok = tokenizer("eng");
    let detok = detokenizer("eng");
    for line in [
        "Don't worry, it's well-known.",
        "Sold, for $9,999.99 on ebay.com.",
        "The U.S.A. team (not the U.K. one) won.",
        "She said \"hello\" and left.",
        "Mail me@example.com or visit https://example.org/a?b=1 now!",
        "Is it 5:30 already?",
        "She's 'quoted' here",
        "That is 4+5.",
        "@handle :) ok",
        "5$ - [b]bold[/b]",
        "great:)",
    ] {
        let tokens = tok.tokenize(line);
        assert_eq!(detok.detokenize(&tokens), line, "tokens: {tokens}");
    }
}
