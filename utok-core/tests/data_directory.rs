//! Loading rule resources from a data directory

use std::fs;
use std::path::Path;
use utok_core::{
    Detokenizer, DetokenizerConfig, Error, ResourceError, Tokenizer, TokenizerConfig,
};

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tok-resource-eng.txt",
        "::contraction won't ::target will n't ::char-split 4,3\n\
         ::contraction shan't ::target shall n't ::char-split 3,2\n\
         ::abbrev Capt. ::exp Captain\n",
    );
    write(
        dir.path(),
        "tok-resource.txt",
        "::punct-split ? ::side both\n\
         ::punct-split . ::side end\n\
         ::punct-split , ::side both\n\
         ::bogus x\n",
    );
    write(
        dir.path(),
        "detok-resource.txt",
        "::auto-attach ? ::side left\n::auto-attach . ::side left\n::auto-attach , ::side left\n",
    );
    dir
}

#[test]
fn test_rules_from_directory() {
    let dir = data_dir();
    let config = TokenizerConfig::builder()
        .languages("eng")
        .data_dir(dir.path())
        .build()
        .unwrap();
    let tok = Tokenizer::new(config).unwrap();

    assert_eq!(tok.tokenize("Capt. Kirk, won't you?"), "Capt. Kirk , will n't you ?");
    assert!(!tok.knows_top_level_domains());

    // the malformed line is reported, not fatal
    let warnings: usize = tok.load_reports().iter().map(|r| r.warnings.len()).sum();
    assert!(warnings >= 1);
    // ::char-split 4,3 does not add up to the length of "won't" and is ignored
    assert!(tok
        .load_reports()
        .iter()
        .flat_map(|r| &r.warnings)
        .any(|w| w.to_string().contains("char-split")));
}

#[test]
fn test_detokenizer_from_directory() {
    let dir = data_dir();
    let config = DetokenizerConfig::builder()
        .languages("eng")
        .data_dir(dir.path())
        .build()
        .unwrap();
    let detok = Detokenizer::new(config).unwrap();
    assert_eq!(detok.detokenize("Capt. Kirk , will n't you ?"), "Capt. Kirk, won't you?");
}

#[test]
fn test_missing_language_file_falls_back() {
    let dir = data_dir();
    let config = TokenizerConfig::builder()
        .languages("deu")
        .data_dir(dir.path())
        .build()
        .unwrap();
    let tok = Tokenizer::new(config).unwrap();
    assert_eq!(tok.tokenize("Hallo, Welt?"), "Hallo , Welt ?");
}

#[test]
fn test_empty_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = TokenizerConfig::builder()
        .languages("eng")
        .data_dir(dir.path())
        .build()
        .unwrap();
    let err = Tokenizer::new(config).unwrap_err();
    assert!(matches!(err, Error::Resource(ResourceError::NoRuleSource { .. })));
}
