// src/extractors/normalizer.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Heading-independent patterns (Lazy Static) ---
static NOTES_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Notes \d{1,2}").expect("Failed to compile NOTES_NUMBER_RE")
});

/// Cleans raw page text so a target heading appears in one canonical form.
///
/// The heading-dependent patterns are compiled once per heading and reused for
/// every page of every document processed for that heading.
#[derive(Debug, Clone)]
pub struct PageNormalizer {
    heading: String,
    // Line breaks, "Section N"/"Note N" running labels and subsection-numbered headings ("7.1 Precision")
    noise_re: Regex,
    // "Method Precision", "Accuracy, Precision", "PRECISION"
    variant_re: Regex,
}

impl PageNormalizer {
    pub fn new(heading: &str) -> Result<Self, ExtractError> {
        let heading = heading.trim();
        if heading.is_empty() {
            return Err(ExtractError::InvalidHeading("heading must not be empty".to_string()));
        }
        let escaped = regex::escape(heading);

        let noise_re = Regex::new(&format!(
            r"\r?\n|Section \d{{1,2}}|Note \d{{1,2}}|\.[0-9][0-9] {h}|\.[0-9] {h}",
            h = escaped
        ))?;
        let variant_re = Regex::new(&format!(
            r"Method {h}|Accuracy, {h}|{upper}",
            h = escaped,
            upper = regex::escape(&heading.to_uppercase())
        ))?;

        Ok(Self {
            heading: heading.to_string(),
            noise_re,
            variant_re,
        })
    }

    /// Normalizes one page of raw text. Pure and deterministic.
    pub fn normalize(&self, raw_text: &str) -> String {
        let text = self.noise_re.replace_all(raw_text, "");
        let text = NOTES_NUMBER_RE.replace_all(&text, "Notes");
        let text = self.variant_re.replace_all(&text, regex::NoExpand(&self.heading));
        text.replace(['(', ')'], " ")
    }
}
