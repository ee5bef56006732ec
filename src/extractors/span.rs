// src/extractors/span.rs

// --- Imports ---
use crate::extractors::section::Marker;
use regex::Regex;
use serde::Serialize;

/// Section boundary conventions, tried strictly in [`BoundaryPattern::ORDER`].
///
/// Each entry captures the text between the start marker and the boundary it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPattern {
    /// Next section number followed by a capitalized heading: "8. Linearity". The common case.
    NextSectionCapitalized,
    /// Next section number without its period ("8 Linearity"), for headings whose
    /// period was lost during text extraction.
    NextSectionBareNumber,
    /// Next section number followed by lower-case text, for headings extracted in lower case.
    NextSectionLowercase,
    /// Upper-case legal disclaimer that closes documents with no further numbered section.
    DisclaimerUpper,
    /// Title-case variant of the same disclaimer.
    DisclaimerTitle,
    /// Appendix heading, the last resort for the final numbered section.
    Appendix,
}

impl BoundaryPattern {
    pub const ORDER: [BoundaryPattern; 6] = [
        BoundaryPattern::NextSectionCapitalized,
        BoundaryPattern::NextSectionBareNumber,
        BoundaryPattern::NextSectionLowercase,
        BoundaryPattern::DisclaimerUpper,
        BoundaryPattern::DisclaimerTitle,
        BoundaryPattern::Appendix,
    ];

    /// Regex for the text following the captured span.
    fn boundary(&self, end: Option<&Marker>) -> Option<String> {
        match self {
            BoundaryPattern::NextSectionCapitalized => end.map(|m| format!(r"{}\s*[A-Z]", m.pattern())),
            BoundaryPattern::NextSectionBareNumber => end.map(|m| format!(r"{}\s+[A-Z]", m.bare_pattern())),
            BoundaryPattern::NextSectionLowercase => end.map(|m| format!(r"{}\s*[a-z]", m.pattern())),
            BoundaryPattern::DisclaimerUpper => Some("THE INFORMATION HEREIN".to_string()),
            BoundaryPattern::DisclaimerTitle => Some("The information herein".to_string()),
            BoundaryPattern::Appendix => Some("Appendix".to_string()),
        }
    }
}

/// Result of span extraction: the captured text and the pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSpan {
    pub text: String,
    pub boundary: Option<BoundaryPattern>,
}

impl ExtractedSpan {
    fn empty() -> Self {
        Self {
            text: String::new(),
            boundary: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpanExtractor;

impl SpanExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the text between `start` and the first boundary pattern that matches.
    ///
    /// Returns an empty span when `start` is absent or no pattern matches.
    pub fn extract(&self, text: &str, start: Option<&Marker>, end: Option<&Marker>) -> ExtractedSpan {
        let Some(start) = start else {
            return ExtractedSpan::empty();
        };
        let start_re = regex::escape(&start.literal_text());

        for pattern in BoundaryPattern::ORDER {
            let Some(boundary) = pattern.boundary(end) else {
                continue;
            };
            let re = match Regex::new(&format!("{}(.+?){}", start_re, boundary)) {
                Ok(re) => re,
                Err(e) => {
                    tracing::warn!("Skipping boundary pattern {:?}: {}", pattern, e);
                    continue;
                }
            };

            if let Some(inner) = re.captures(text).and_then(|c| c.get(1)) {
                tracing::debug!(
                    "Boundary {:?} matched after '{}' ({} bytes)",
                    pattern,
                    start,
                    inner.as_str().len()
                );
                return ExtractedSpan {
                    text: inner.as_str().to_string(),
                    boundary: Some(pattern),
                };
            }
            tracing::trace!("Boundary {:?} did not match", pattern);
        }

        tracing::warn!("No boundary pattern matched after start marker '{}'", start);
        ExtractedSpan::empty()
    }
}
