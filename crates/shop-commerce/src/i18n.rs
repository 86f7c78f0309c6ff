//! Multilingual text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text keyed by language code, e.g. `{"en": "Shirt", "fr": "Chemise"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Create empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// The same text for every language in `langs`.
    pub fn uniform<S: AsRef<str>>(text: &str, langs: &[S]) -> Self {
        langs
            .iter()
            .map(|lang| (lang.as_ref().to_string(), text.to_string()))
            .collect()
    }

    /// Resolve the text for `lang`.
    ///
    /// Falls back to `default_lang`, then to the first language in key
    /// order, then to the empty string.
    pub fn resolve(&self, lang: &str, default_lang: &str) -> &str {
        self.0
            .get(lang)
            .or_else(|| self.0.get(default_lang))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// Return a copy with `lang` set to `text`.
    pub fn with(&self, lang: &str, text: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.0.insert(lang.to_string(), text.into());
        copy
    }

    /// Set `lang` to `text` in place.
    pub fn insert(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        self.0.insert(lang.into(), text.into());
    }

    /// Whether `text` is the value for any language.
    pub fn contains_value(&self, text: &str) -> bool {
        self.0.values().any(|v| v == text)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Languages present, in key order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for LocalizedText {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_fallback_chain() {
        let text = LocalizedText::from([("en", "Shirt"), ("fr", "Chemise")]);

        assert_eq!(text.resolve("fr", "en"), "Chemise");
        assert_eq!(text.resolve("de", "en"), "Shirt");
        assert_eq!(text.resolve("de", "es"), "Shirt");
        assert_eq!(LocalizedText::new().resolve("en", "en"), "");
    }

    #[test]
    fn test_first_value_is_in_key_order() {
        let text = LocalizedText::from([("sv", "Skjorta"), ("de", "Hemd")]);
        assert_eq!(text.resolve("en", "en"), "Hemd");
    }

    #[test]
    fn test_uniform_and_with() {
        let text = LocalizedText::uniform("Sale", &["en", "fr"]);
        assert_eq!(text.get("fr"), Some("Sale"));

        let updated = text.with("fr", "Soldes");
        assert_eq!(updated.get("fr"), Some("Soldes"));
        assert_eq!(text.get("fr"), Some("Sale"));
        assert_eq!(updated.languages().collect::<Vec<_>>(), vec!["en", "fr"]);
    }

    #[test]
    fn test_serde_is_a_plain_map() {
        let text: LocalizedText = serde_json::from_str(r#"{"en":"Black"}"#).unwrap();
        assert_eq!(text.get("en"), Some("Black"));
        assert_eq!(serde_json::to_string(&text).unwrap(), r#"{"en":"Black"}"#);
    }
}
