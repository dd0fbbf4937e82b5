use regex::Regex;

/// Pulls volume numbers out of rendered page text.
///
/// Matches `#` followed by optional whitespace and a digit run ending on a
/// word boundary, so `#123,` counts but `#123abc` does not. The result is
/// deduplicated and sorted ascending. Digit runs too large for u32 are
/// ignored.
pub fn extract_volumes(text: &str) -> Vec<u32> {
    let re = Regex::new(r"#\s*(\d+)\b").unwrap();

    let mut volumes: Vec<u32> = re
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .collect();

    volumes.sort_unstable();
    volumes.dedup();
    volumes
}
