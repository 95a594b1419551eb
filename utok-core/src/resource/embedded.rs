//! Default resource files compiled into the library

use crate::error::ResourceError;
use std::collections::HashMap;
use std::sync::OnceLock;

static EMBEDDED: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn table() -> &'static HashMap<&'static str, &'static str> {
    EMBEDDED.get_or_init(|| {
        HashMap::from([
            ("tok-resource.txt", include_str!("../../data/tok-resource.txt")),
            ("tok-resource-eng.txt", include_str!("../../data/tok-resource-eng.txt")),
            (
                "tok-resource-eng-global.txt",
                include_str!("../../data/tok-resource-eng-global.txt"),
            ),
            ("tok-resource-fra.txt", include_str!("../../data/tok-resource-fra.txt")),
            ("detok-resource.txt", include_str!("../../data/detok-resource.txt")),
            (
                "top-level-domain-codes.txt",
                include_str!("../../data/top-level-domain-codes.txt"),
            ),
        ])
    })
}

/// Text of embedded resource file `name`
pub fn get(name: &str) -> Option<&'static str> {
    table().get(name).copied()
}

/// Names of all embedded resource files, sorted
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = table().keys().copied().collect();
    names.sort_unstable();
    names
}

/// Language codes with a dedicated embedded resource file
pub fn languages() -> Vec<&'static str> {
    names()
        .into_iter()
        .filter_map(|name| name.strip_prefix("tok-resource-")?.strip_suffix(".txt"))
        .filter(|code| *code != "eng-global")
        .collect()
}

/// Text of the embedded rule file of language `lang`
pub fn language_file(lang: &str) -> Result<&'static str, ResourceError> {
    get(&format!("tok-resource-{lang}.txt")).ok_or_else(|| ResourceError::UnknownLanguage(lang.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_files_present() {
        assert!(get("tok-resource.txt").is_some_and(|text| text.contains("::punct-split")));
        assert!(get("detok-resource.txt").is_some_and(|text| text.contains("::auto-attach")));
        assert!(get("tok-resource-xyz.txt").is_none());
    }

    #[test]
    fn test_languages() {
        assert_eq!(languages(), vec!["eng", "fra"]);
        assert!(language_file("fra").is_ok());
        assert!(matches!(
            language_file("xyz"),
            Err(ResourceError::UnknownLanguage(lang)) if lang == "xyz"
        ));
    }
}
