use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for language tag handling
///
/// The cloud APIs take BCP 47 style tags ("en", "en-US", "zh-Hant-TW").
/// This module validates and normalizes such tags using the ISO 639
/// tables from isolang for the primary language subtag.

/// Source language value meaning "let the provider detect it"
pub const AUTO_DETECT: &str = "auto";

/// Deprecated primary subtags still emitted by some clients
const LEGACY_ALIASES: &[(&str, &str)] = &[("iw", "he"), ("jw", "jv"), ("in", "id"), ("ji", "yi")];

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Whether the code asks for automatic source language detection
pub fn is_auto_detect(code: &str) -> bool {
    let code = code.trim();
    code.is_empty() || code.eq_ignore_ascii_case(AUTO_DETECT)
}

/// Resolve a primary language subtag to an isolang language
fn resolve_primary(primary: &str) -> Option<Language> {
    let primary = primary.to_lowercase();
    let primary = LEGACY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == primary)
        .map(|(_, current)| current.to_string())
        .unwrap_or(primary);

    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(part2b, _)| *part2b == primary)
                .map(|(_, part2t)| *part2t)
                .unwrap_or(primary.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate a language tag and return it in canonical casing
///
/// The primary subtag is lowercased (legacy aliases are rewritten), 4-letter
/// script subtags are title-cased and 2-letter region subtags are uppercased.
pub fn normalize_language_tag(code: &str) -> Result<String> {
    let trimmed = code.trim().replace('_', "-");
    if trimmed.is_empty() {
        return Err(anyhow!("Language code is empty"));
    }

    let mut parts = trimmed.split('-');
    let primary = parts.next().unwrap_or_default();
    let language = resolve_primary(primary)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    // Keep the shortest code the caller's tag maps to
    let primary = language
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| language.to_639_3().to_string());

    let mut normalized = primary;
    for subtag in parts {
        if subtag.is_empty() || subtag.len() > 8 || !subtag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!("Invalid language code: {}", code));
        }
        normalized.push('-');
        if subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
            let mut chars = subtag.chars();
            if let Some(first) = chars.next() {
                normalized.push(first.to_ascii_uppercase());
                normalized.push_str(&chars.as_str().to_ascii_lowercase());
            }
        } else if subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
            normalized.push_str(&subtag.to_ascii_uppercase());
        } else {
            normalized.push_str(&subtag.to_ascii_lowercase());
        }
    }

    Ok(normalized)
}

/// Validate a language tag, accepting "auto" for detection
pub fn normalize_source_language(code: &str) -> Result<Option<String>> {
    if is_auto_detect(code) {
        return Ok(None);
    }
    normalize_language_tag(code).map(Some)
}

/// Normalize a language code's primary subtag to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let trimmed = code.trim().replace('_', "-");
    let primary = trimmed.split('-').next().unwrap_or_default();
    resolve_primary(primary)
        .map(|language| language.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
