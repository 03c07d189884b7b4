//! Translation bundles and language selection
//!
//! Bundles are nested JSON objects addressed with dotted keys
//! (`common.install` -> `{"common": {"install": "..."}}`). Lookup walks the
//! active language, then the other supported language, then the fallback
//! language, and finally gives back the key itself.

use crate::error::I18nError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

static PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("valid regex"));

const BUILTIN_PT_BR: &str = include_str!("../locales/pt-BR.json");
const BUILTIN_EN_US: &str = include_str!("../locales/en-US.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    PtBr,
    EnUs,
}

/// Used when neither the active nor the other language has a key
pub const FALLBACK_LANGUAGE: Language = Language::PtBr;

impl Language {
    pub const ALL: [Language; 2] = [Language::PtBr, Language::EnUs];

    pub fn code(&self) -> &'static str {
        match self {
            Language::PtBr => "pt-BR",
            Language::EnUs => "en-US",
        }
    }

    /// Language name written in that language
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::PtBr => "Português (Brasil)",
            Language::EnUs => "English (US)",
        }
    }

    pub fn other(&self) -> Language {
        match self {
            Language::PtBr => Language::EnUs,
            Language::EnUs => Language::PtBr,
        }
    }

    /// Explicit request (`--lang`), case-insensitive; unknown codes are ignored
    pub fn parse_explicit(value: &str) -> Option<Language> {
        match value.trim().to_lowercase().as_str() {
            "pt-br" => Some(Language::PtBr),
            "en-us" => Some(Language::EnUs),
            _ => None,
        }
    }

    /// Stored preference, which is always written with the canonical code
    pub fn parse_stored(value: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|lang| lang.code() == value)
    }

    /// Any Portuguese variant maps to pt-BR, everything else to en-US
    pub fn from_system(value: &str) -> Language {
        if value.to_lowercase().starts_with("pt") {
            Language::PtBr
        } else {
            Language::EnUs
        }
    }

    fn bundle_file(&self) -> String {
        format!("{}.json", self.code())
    }

    fn builtin_bundle(&self) -> &'static str {
        match self {
            Language::PtBr => BUILTIN_PT_BR,
            Language::EnUs => BUILTIN_EN_US,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Priority: explicit request > stored preference > system locale
pub fn resolve_language(
    explicit: Option<&str>,
    stored: Option<&str>,
    system: Option<&str>,
) -> Language {
    if let Some(lang) = explicit.and_then(Language::parse_explicit) {
        return lang;
    }
    if let Some(lang) = stored.and_then(Language::parse_stored) {
        return lang;
    }
    Language::from_system(system.unwrap_or("en-US"))
}

/// The locale the environment reports, in the usual POSIX precedence
pub fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

/// A piece of UI text bound to a translation key, re-translated when the
/// language changes
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedText {
    pub key: &'static str,
    pub text: String,
}

impl TaggedText {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            text: key.to_string(),
        }
    }
}

pub struct I18n {
    current: Language,
    translations: HashMap<Language, Value>,
    loaded: HashSet<Language>,
}

impl I18n {
    pub fn new(current: Language) -> Self {
        Self {
            current,
            translations: HashMap::new(),
            loaded: HashSet::new(),
        }
    }

    /// Loads bundles from `locales_dir` when given, then fills any language
    /// still missing from the bundles compiled into the binary
    pub fn load(current: Language, locales_dir: Option<&Path>) -> Self {
        let mut i18n = Self::new(current);
        if let Some(dir) = locales_dir {
            i18n.load_languages(dir);
        }
        for lang in Language::ALL {
            if !i18n.is_loaded(lang) {
                if let Err(e) = i18n.load_str(lang, lang.builtin_bundle()) {
                    log::error!("built-in bundle {} is invalid: {}", lang, e);
                }
            }
        }
        i18n
    }

    pub fn is_loaded(&self, lang: Language) -> bool {
        self.loaded.contains(&lang)
    }

    pub fn load_str(&mut self, lang: Language, json: &str) -> Result<(), serde_json::Error> {
        let data: Value = serde_json::from_str(json)?;
        self.translations.insert(lang, data);
        self.loaded.insert(lang);
        Ok(())
    }

    /// Loads one bundle file; a language that is already loaded is skipped
    pub fn load_language(&mut self, lang: Language, path: &Path) -> Result<(), I18nError> {
        if self.is_loaded(lang) {
            return Ok(());
        }
        let content = std::fs::read_to_string(path).map_err(|source| I18nError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load_str(lang, &content).map_err(|source| I18nError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads `<dir>/pt-BR.json` and `<dir>/en-US.json`; failures are logged
    pub fn load_languages(&mut self, dir: &Path) {
        for lang in Language::ALL {
            if let Err(e) = self.load_language(lang, &dir.join(lang.bundle_file())) {
                log::error!("failed to load translations for {}: {}", lang, e);
            }
        }
    }

    pub fn language(&self) -> Language {
        self.current
    }

    pub fn set_language(&mut self, lang: Language) {
        self.current = lang;
    }

    pub fn t(&self, key: &str) -> String {
        let lang = self.current;
        lookup(self.translations.get(&lang), key)
            .or_else(|| lookup(self.translations.get(&lang.other()), key))
            .or_else(|| lookup(self.translations.get(&FALLBACK_LANGUAGE), key))
            .unwrap_or(key)
            .to_string()
    }

    /// `t` plus `{name}` placeholder substitution; unknown placeholders stay as-is
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        replace_params(&self.t(key), params)
    }

    pub fn translate_labels(&self, labels: &mut [TaggedText]) {
        for label in labels {
            label.text = self.t(label.key);
        }
    }
}

fn lookup<'a>(bundle: Option<&'a Value>, key: &str) -> Option<&'a str> {
    let mut current = bundle?;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    // empty strings count as missing
    current.as_str().filter(|text| !text.is_empty())
}

pub fn replace_params(text: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return text.to_string();
    }
    PARAM_RE
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> I18n {
        let mut i18n = I18n::new(Language::EnUs);
        i18n.load_str(
            Language::PtBr,
            r#"{"common": {"install": "Instalar", "only_pt": "Somente português", "empty": "vazio"},
                "greeting": "Olá {name}!"}"#,
        )
        .unwrap();
        i18n.load_str(
            Language::EnUs,
            r#"{"common": {"install": "Install", "empty": ""}, "greeting": "Hello {name}, {other}!"}"#,
        )
        .unwrap();
        i18n
    }

    #[test]
    fn language_priority_is_explicit_then_stored_then_system() {
        assert_eq!(resolve_language(Some("EN-us"), Some("pt-BR"), Some("pt_BR.UTF-8")), Language::EnUs);
        assert_eq!(resolve_language(Some("fr-FR"), Some("en-US"), Some("pt_BR.UTF-8")), Language::EnUs);
        assert_eq!(resolve_language(None, Some("pt-BR"), Some("en_US.UTF-8")), Language::PtBr);
        assert_eq!(resolve_language(None, Some("garbage"), Some("pt_PT.UTF-8")), Language::PtBr);
        assert_eq!(resolve_language(None, None, Some("de_DE.UTF-8")), Language::EnUs);
        assert_eq!(resolve_language(None, None, None), Language::EnUs);
    }

    #[test]
    fn any_portuguese_variant_maps_to_pt_br() {
        for locale in ["pt", "pt-PT", "PT_br.UTF-8", "pt_AO"] {
            assert_eq!(Language::from_system(locale), Language::PtBr);
        }
        assert_eq!(Language::from_system("es_ES"), Language::EnUs);
    }

    #[test]
    fn lookup_uses_active_language_first() {
        assert_eq!(sample().t("common.install"), "Install");
    }

    #[test]
    fn key_only_in_fallback_bundle_returns_fallback_text() {
        let i18n = sample();
        assert_eq!(i18n.t("common.only_pt"), "Somente português");
    }

    #[test]
    fn empty_translation_falls_through_to_other_language() {
        assert_eq!(sample().t("common.empty"), "vazio");
    }

    #[test]
    fn missing_key_returns_key_itself() {
        let i18n = sample();
        assert_eq!(i18n.t("common.nope"), "common.nope");
        // a branch is not a string
        assert_eq!(i18n.t("common"), "common");
    }

    #[test]
    fn placeholders_are_substituted_and_unknown_ones_kept() {
        let i18n = sample();
        assert_eq!(i18n.t_with("greeting", &[("name", "Ana")]), "Hello Ana, {other}!");
    }

    #[test]
    fn switching_language_retranslates_tagged_labels() {
        let mut i18n = sample();
        let mut labels = vec![TaggedText::new("common.install"), TaggedText::new("missing.key")];
        i18n.translate_labels(&mut labels);
        assert_eq!(labels[0].text, "Install");

        i18n.set_language(Language::PtBr);
        i18n.translate_labels(&mut labels);
        assert_eq!(labels[0].text, "Instalar");
        assert_eq!(labels[1].text, "missing.key");
    }

    #[test]
    fn builtin_bundles_cover_every_english_key_in_portuguese() {
        let i18n = I18n::load(Language::EnUs, None);
        let en: Value = serde_json::from_str(BUILTIN_EN_US).unwrap();
        let pt: Value = serde_json::from_str(BUILTIN_PT_BR).unwrap();

        fn keys(prefix: &str, value: &Value, out: &mut Vec<String>) {
            if let Value::Object(map) = value {
                for (k, v) in map {
                    let key = if prefix.is_empty() { k.clone() } else { format!("{}.{}", prefix, k) };
                    keys(&key, v, out);
                }
            } else {
                out.push(prefix.to_string());
            }
        }

        let mut en_keys = Vec::new();
        keys("", &en, &mut en_keys);
        let mut pt_keys = Vec::new();
        keys("", &pt, &mut pt_keys);
        en_keys.sort();
        pt_keys.sort();
        assert_eq!(en_keys, pt_keys);
        assert_ne!(i18n.t("common.install"), "common.install");
    }

    #[test]
    fn bundle_directory_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en-US.json"), r#"{"common": {"install": "Get it"}}"#).unwrap();
        std::fs::write(dir.path().join("pt-BR.json"), "{not json").unwrap();

        let i18n = I18n::load(Language::EnUs, Some(dir.path()));
        assert_eq!(i18n.t("common.install"), "Get it");
        // the broken file is replaced by the built-in bundle
        assert!(i18n.is_loaded(Language::PtBr));
    }
}
