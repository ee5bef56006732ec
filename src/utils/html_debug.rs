// src/utils/html_debug.rs
use crate::utils::error::AppError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Renders plain document text as HTML with the given byte ranges highlighted.
/// Overlapping highlights after the first are dropped.
pub fn render_debug_html(text: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");

    // CSS for highlight colors
    debug_html.push_str("body { font-family: monospace; white-space: pre-wrap; }\n");
    debug_html.push_str(".highlight-start { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-end { background-color: #FFA500; }\n");
    debug_html.push_str(".highlight-landmark { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-reference { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    for (start, end, highlight_type) in sorted_highlights {
        if start < last_pos || end > text.len() {
            continue;
        }
        debug_html.push_str(&escape_html(&text[last_pos..start]));

        let css_class = match highlight_type {
            "start" => "highlight-start",
            "end" => "highlight-end",
            "landmark" => "highlight-landmark",
            "reference" => "highlight-reference",
            _ => "highlight-custom",
        };

        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Type: {}\">",
            css_class, start, end, highlight_type
        ));
        debug_html.push_str(&escape_html(&text[start..end]));
        debug_html.push_str("</span>");

        last_pos = end;
    }

    if last_pos < text.len() {
        debug_html.push_str(&escape_html(&text[last_pos..]));
    }

    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Writes an annotated copy of `text` with every match of the given regex patterns highlighted.
pub fn create_debug_html(text: &str, filename: &Path, patterns: &[(String, &str)]) -> Result<(), AppError> {
    use regex::Regex;

    let mut highlights = Vec::new();

    // Find all matches for each pattern and add them to highlights
    for (pattern, highlight_type) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(text) {
            highlights.push((mat.start(), mat.end(), *highlight_type));
        }
    }

    let mut file = File::create(filename)?;
    file.write_all(render_debug_html(text, &highlights).as_bytes())?;

    tracing::info!("Saved debug HTML to {}", filename.display());
    Ok(())
}
