// src/extractors/section.rs

// --- Imports ---
use crate::extractors::span::BoundaryPattern;
use crate::extractors::tables::TableCandidate;
use crate::utils::error::ExtractError;
use regex::Regex;
use serde::Serialize;
use std::fmt;

// --- Data Structures ---

/// How a numbered heading separates its number from the heading name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    /// "7. Precision", "7.Precision", "7.  Precision"
    Period,
    /// "7 Precision"
    Space,
}

/// A located (or derived) section number marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub number: u32,
    pub separator: Separator,
    /// Literal text as found in the normalized document (start markers only).
    pub literal: Option<String>,
}

impl Marker {
    /// The marker of the section that follows this one: number + 1, same separator.
    pub fn next(&self) -> Marker {
        Marker {
            number: self.number + 1,
            separator: self.separator,
            literal: None,
        }
    }

    /// Regex fragment matching this marker as a section prefix ("8\." or "8 ").
    pub fn pattern(&self) -> String {
        match self.separator {
            Separator::Period => format!(r"{}\.", self.number),
            Separator::Space => format!("{} ", self.number),
        }
    }

    /// Same as [`Marker::pattern`] with the period dropped ("8" or "8 ").
    pub fn bare_pattern(&self) -> String {
        match self.separator {
            Separator::Period => self.number.to_string(),
            Separator::Space => format!("{} ", self.number),
        }
    }

    /// Text used to find the marker inside a single page.
    pub fn literal_text(&self) -> String {
        self.literal.clone().unwrap_or_else(|| match self.separator {
            Separator::Period => format!("{}.", self.number),
            Separator::Space => format!("{} ", self.number),
        })
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal_text())
    }
}

/// Start/end markers for a heading; both absent when the heading cannot be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMarkers {
    pub start: Option<Marker>,
    pub end: Option<Marker>,
}

impl SectionMarkers {
    pub fn absent() -> Self {
        Self { start: None, end: None }
    }

    pub fn is_absent(&self) -> bool {
        self.start.is_none()
    }
}

/// The section located for one heading in one document, with its correlated tables.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSpan {
    pub heading: String,
    pub start_marker: Option<Marker>,
    pub end_marker: Option<Marker>,
    pub text: Option<String>,
    /// Boundary pattern that produced `text`, if any matched.
    pub boundary: Option<BoundaryPattern>,
    pub tables: Vec<TableCandidate>,
}

impl SectionSpan {
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

// --- Locator ---

/// Finds the first numbered occurrence of a heading and derives the next section's marker.
#[derive(Debug, Clone)]
pub struct SectionLocator {
    heading: String,
    // ASCII number, then "." with up to two spaces, or one/two spaces, then the heading.
    start_re: Regex,
}

impl SectionLocator {
    pub fn new(heading: &str) -> Result<Self, ExtractError> {
        let start_re = Regex::new(&format!(
            r"([0-9]{{1,2}})(\.\s{{0,2}}|\s{{1,2}}){}",
            regex::escape(heading)
        ))?;
        Ok(Self {
            heading: heading.to_string(),
            start_re,
        })
    }

    /// Locates the heading across normalized pages (joined with a single space).
    ///
    /// First occurrence in document order wins; later duplicates are never considered.
    pub fn locate<S: AsRef<str>>(&self, pages: &[S]) -> SectionMarkers {
        if !pages.iter().any(|p| p.as_ref().contains(&self.heading)) {
            tracing::debug!("Heading '{}' does not occur on any page", self.heading);
            return SectionMarkers::absent();
        }

        let text = join_pages(pages);
        let Some(caps) = self.start_re.captures(&text) else {
            tracing::debug!("Heading '{}' occurs but never as a numbered heading", self.heading);
            return SectionMarkers::absent();
        };

        let number = match caps[1].parse::<u32>() {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Unparsable section number '{}': {}", &caps[1], e);
                return SectionMarkers::absent();
            }
        };
        let separator = if caps[2].contains('.') {
            Separator::Period
        } else {
            Separator::Space
        };

        let start = Marker {
            number,
            separator,
            literal: Some(caps[0].to_string()),
        };
        let end = start.next();
        tracing::info!(
            "Located '{}' at marker '{}', next section marker '{}'",
            self.heading,
            start,
            end
        );

        SectionMarkers {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Joins normalized pages the way every downstream search sees the document.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn locate(pages: &[&str]) -> SectionMarkers {
        SectionLocator::new("Precision").unwrap().locate(pages)
    }

    #[test]
    fn test_absent_when_heading_missing() {
        let markers = locate(&["1. Scope", "2. Apparatus", "3. Procedure"]);
        assert!(markers.is_absent());
        assert!(markers.end.is_none());
    }

    #[test]
    fn test_absent_when_heading_never_numbered() {
        let markers = locate(&["The Precision is good", "no numbers here"]);
        assert_eq!(markers, SectionMarkers::absent());
    }

    #[test]
    fn test_period_separator_preserved() {
        let markers = locate(&["intro", "7. Precision The repeatability"]);
        let start = markers.start.unwrap();
        let end = markers.end.unwrap();
        assert_eq!(start.number, 7);
        assert_eq!(start.separator, Separator::Period);
        assert_eq!(start.literal.as_deref(), Some("7. Precision"));
        assert_eq!(end.number, 8);
        assert_eq!(end.separator, Separator::Period);
        assert_eq!(end.pattern(), r"8\.");
    }

    #[test]
    fn test_space_separator_preserved() {
        let markers = locate(&["12 Precision was determined"]);
        let start = markers.start.unwrap();
        let end = markers.end.unwrap();
        assert_eq!(start.number, 12);
        assert_eq!(start.separator, Separator::Space);
        assert_eq!(end.number, 13);
        assert_eq!(end.pattern(), "13 ");
        assert_eq!(end.bare_pattern(), "13 ");
    }

    #[test]
    fn test_double_space_after_period() {
        let markers = locate(&["9.  Precision"]);
        assert_eq!(markers.start.unwrap().literal.as_deref(), Some("9.  Precision"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let markers = locate(&["3 Precision see later", "10. Precision real section"]);
        assert_eq!(markers.start.unwrap().number, 3);
        assert_eq!(markers.end.unwrap().number, 4);
    }

    #[test]
    fn test_end_marker_is_start_plus_one() {
        for n in [1u32, 5, 9, 10, 42, 98] {
            let page = format!("{}. Precision", n);
            let markers = locate(&[page.as_str()]);
            let start = markers.start.unwrap();
            assert_eq!(markers.end.unwrap().number, start.number + 1);
        }
    }

    #[test]
    fn test_non_ascii_digits_are_not_section_numbers() {
        let markers = locate(&["\u{FF17} Precision header", "7. Precision The RSD 8. Report"]);
        let start = markers.start.unwrap();
        assert_eq!(start.number, 7);
        assert_eq!(start.literal.as_deref(), Some("7. Precision"));
        assert_eq!(markers.end.unwrap().number, 8);
    }

    #[test]
    fn test_markers_span_page_join() {
        // Page join inserts a space, so a number ending one page can head the next.
        let markers = locate(&["see item 5", "Precision is described"]);
        assert_eq!(markers.start.unwrap().literal.as_deref(), Some("5 Precision"));
    }
}
