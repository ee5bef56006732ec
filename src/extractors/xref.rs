// src/extractors/xref.rs

// --- Imports ---
use crate::extractors::section::join_pages;
use crate::extractors::tables::{TableCandidate, TableCorrelator, TableOrigin};
use crate::pdf::Document;
use crate::tabula::{PageRange, TableExtractor};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Constants ---
/// Ordinals recognized after "Table"; one more is kept so every ordinal has a successor.
const MAX_ORDINAL: u32 = 49;

/// Characters that never belong to a table number ("III," "3." "[2]").
const TOKEN_PUNCTUATION: [char; 7] = ['\'', '"', ',', '.', '\\', '[', ']'];

/// Trailing characters used as the window bound when the next reference never appears.
const FALLBACK_WINDOW_CHARS: usize = 8;

/// Phrases that open the closing part of a document (disclaimer or appendix).
pub const LANDMARK_PHRASES: [&str; 4] = [
    "THE IFORMATION HEREIN",
    "THE INFORMATION HEREIN",
    "The information herein",
    "Appendix",
];

// --- Regex Patterns (Lazy Static) ---
// Uses of "table" that do not name a specific table.
static TABLE_IDIOM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\.\.|following tab|tables? be|Metablen|in the tables?\.?|[Tt]ables? (?:be|of)|[a-z][a-z]table|table according",
    )
    .expect("Failed to compile TABLE_IDIOM_RE")
});

static SEE_APPENDIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"see Appendix").expect("Failed to compile SEE_APPENDIX_RE")
});

static NUMERALS: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    (1..=MAX_ORDINAL + 1)
        .map(|n| (to_roman(n), n.to_string()))
        .collect()
});

// --- Data Structures ---

/// A table named in the section text, with the name that bounds its lookup window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReference {
    pub name: String,
    pub next_name: String,
}

/// First page of the closing part of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmark {
    pub page: usize,
    pub phrase: &'static str,
}

pub fn to_roman(mut n: u32) -> String {
    const DIGITS: [(u32, &str); 7] = [(50, "L"), (40, "XL"), (10, "X"), (9, "IX"), (5, "V"), (4, "IV"), (1, "I")];
    let mut out = String::new();
    for (value, digit) in DIGITS {
        while n >= value {
            out.push_str(digit);
            n -= value;
        }
    }
    out
}

/// Ordinal (1..=49) written as a roman or arabic numeral token.
fn ordinal(token: &str) -> Option<u32> {
    NUMERALS
        .iter()
        .take(MAX_ORDINAL as usize)
        .position(|(roman, arabic)| token == roman || token == arabic)
        .map(|i| i as u32 + 1)
}

/// Whether the section names a table at all, ignoring non-referential idioms.
pub fn mentions_tables(span_text: &str) -> bool {
    TABLE_IDIOM_RE
        .replace_all(span_text, "")
        .to_lowercase()
        .contains("table")
}

/// Ordered, de-duplicated references; each ordinal yields a roman and an arabic name.
pub fn table_references(span_text: &str) -> Vec<TableReference> {
    if !mentions_tables(span_text) {
        return Vec::new();
    }

    let mut ordinals: Vec<u32> = Vec::new();
    let mut previous = String::new();
    for raw in span_text.split(' ') {
        let token: String = raw.chars().filter(|c| !TOKEN_PUNCTUATION.contains(c)).collect();
        if previous.contains("ble") {
            if let Some(n) = ordinal(&token) {
                if !ordinals.contains(&n) {
                    ordinals.push(n);
                }
            }
        }
        previous = token;
    }

    ordinals
        .into_iter()
        .flat_map(|n| {
            let (roman, arabic) = &NUMERALS[n as usize - 1];
            let (next_roman, next_arabic) = &NUMERALS[n as usize];
            [
                TableReference {
                    name: format!("Table {}", roman),
                    next_name: format!("Table {}", next_roman),
                },
                TableReference {
                    name: format!("Table {}", arabic),
                    next_name: format!("Table {}", next_arabic),
                },
            ]
        })
        .collect()
}

/// First page containing a closing phrase; "see Appendix" pointers do not count.
pub fn find_landmark<S: AsRef<str>>(pages: &[S]) -> Option<Landmark> {
    pages.iter().enumerate().find_map(|(index, page)| {
        let text = SEE_APPENDIX_RE.replace_all(page.as_ref(), "");
        LANDMARK_PHRASES
            .iter()
            .copied()
            .find(|phrase| text.contains(phrase))
            .map(|phrase| Landmark { page: index, phrase })
    })
}

/// `name` occurring in `text` as a whole reference ("Table I" but not inside "Table II").
pub fn mentions_reference(text: &str, name: &str) -> bool {
    text.match_indices(name).any(|(i, m)| {
        text[i + m.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

/// Text between a reference and the next reference, or the last few characters of the
/// document when the next one never appears.
pub fn reference_window(trailing_text: &str, reference: &TableReference) -> String {
    let bound = if trailing_text.contains(&reference.next_name) {
        reference.next_name.clone()
    } else {
        let skip = trailing_text.chars().count().saturating_sub(FALLBACK_WINDOW_CHARS);
        trailing_text.chars().skip(skip).collect()
    };
    if bound.is_empty() {
        return String::new();
    }

    let pattern = format!("{}(.+?){}", regex::escape(&reference.name), regex::escape(&bound));
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(trailing_text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Reference window pattern failed to compile: {}", e);
            String::new()
        }
    }
}

// --- Resolver ---

/// Finds tables named in the section but printed in the closing part of the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossReferenceResolver;

impl CrossReferenceResolver {
    pub fn new() -> Self {
        Self
    }

    /// Stops at the first reference whose tables pass the membership test.
    pub async fn resolve<E: TableExtractor>(
        &self,
        correlator: &TableCorrelator<'_, E>,
        document: &Document,
        span_text: &str,
    ) -> Vec<TableCandidate> {
        let references = table_references(span_text);
        if references.is_empty() {
            return Vec::new();
        }

        let pages = document.normalized_pages();
        let Some(landmark) = find_landmark(&pages) else {
            tracing::debug!(
                "{} table references in section but no landmark page in {}",
                references.len(),
                document.id
            );
            return Vec::new();
        };
        tracing::debug!(
            "Landmark '{}' on page {}, scanning forward for {} references",
            landmark.phrase,
            landmark.page,
            references.len()
        );

        let trailing_text = join_pages(&pages[landmark.page..]);
        let page_count = document.page_count();

        for reference in &references {
            let Some(page) = (landmark.page..page_count).find(|&k| mentions_reference(pages[k], &reference.name)) else {
                tracing::trace!("'{}' not found after landmark", reference.name);
                continue;
            };

            let range = PageRange::clamped(page + 1, page + 2, page_count);
            let origin = TableOrigin::CrossReferenced {
                reference: reference.name.clone(),
                window: reference_window(&trailing_text, reference),
            };
            tracing::debug!("'{}' found on page {}, requesting pages {}", reference.name, page, range);

            let tables = correlator.correlate(range, &trailing_text, &origin).await;
            if !tables.is_empty() {
                tracing::info!("Confirmed {} tables for '{}' in {}", tables.len(), reference.name, document.id);
                return tables;
            }
        }

        Vec::new()
    }
}
