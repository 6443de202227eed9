//! Conversion of example prose into positional stdin lines
//!
//! Examples are written for humans (`nums = [2,7,11,15], target = 9`), while
//! the generated drivers read one value per line (`[2,7,11,15]` then `9`).

use regex::Regex;
use std::sync::OnceLock;

/// Variable names stripped from free-form example inputs, in order
const ASSIGNED_NAMES: [&str; 5] = ["nums", "target", "head", "root", "s"];

fn assignment_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ASSIGNED_NAMES
            .iter()
            .filter_map(|name| Regex::new(&format!(r"{}\s*=\s*", name)).ok())
            .collect()
    })
}

/// First `[...]` span of the input, brackets included
fn first_bracketed(input: &str) -> Option<&str> {
    let start = input.find('[')?;
    let end = input.find(']')?;
    (start < end).then(|| &input[start..=end])
}

/// Convert an example's input text into the stdin a driver expects
pub fn example_to_stdin(input: &str) -> String {
    let input = input.trim();

    if input.contains("nums") && input.contains("target") {
        let mut lines: Vec<String> = Vec::new();

        if let Some(array) = first_bracketed(input) {
            lines.push(array.to_string());
        }

        let target = input
            .split(',')
            .map(str::trim)
            .find(|part| part.starts_with("target"));
        if let Some(part) = target {
            let value = part
                .trim_start_matches("target")
                .trim_start()
                .trim_start_matches('=')
                .trim();
            lines.push(value.to_string());
        }

        return lines.join("\n");
    }

    if input.contains("head") {
        if let Some(array) = first_bracketed(input) {
            return array.to_string();
        }
    }

    if input.starts_with('[') && input.ends_with(']') {
        return input.to_string();
    }

    let mut cleaned = input.to_string();
    for pattern in assignment_patterns() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = cleaned.replace('"', "");

    if cleaned.contains('[') && cleaned.contains(']') {
        return cleaned.trim().to_string();
    }

    if cleaned.contains(',') {
        return cleaned
            .split(',')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n");
    }

    cleaned.trim().to_string()
}
