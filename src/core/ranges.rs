/// Compresses a sorted integer sequence into a run-length string:
/// `[1, 2, 3, 7, 8, 10]` becomes `"1–3, 7–8, 10"` (en dash).
///
/// A run is broken by any gap, including a gap of exactly one value.
/// Empty input yields the empty string.
pub fn format_ranges(values: &[u32]) -> String {
    let mut iter = values.iter().copied();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut parts: Vec<String> = Vec::new();
    let mut start = first;
    let mut prev = first;

    for n in iter {
        if n == prev + 1 {
            prev = n;
            continue;
        }
        parts.push(render_run(start, prev));
        start = n;
        prev = n;
    }

    parts.push(render_run(start, prev));
    parts.join(", ")
}

fn render_run(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}–{}", start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_runs_collapse() {
        assert_eq!(format_ranges(&[1, 2, 3, 7, 8, 10]), "1–3, 7–8, 10");
    }

    #[test]
    fn test_single_value() {
        assert_eq!(format_ranges(&[4]), "4");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_ranges(&[]), "");
    }

    #[test]
    fn test_gap_of_one_breaks_run() {
        assert_eq!(format_ranges(&[1, 3]), "1, 3");
    }

    #[test]
    fn test_two_element_run_uses_dash() {
        assert_eq!(format_ranges(&[5, 6]), "5–6");
    }

    // Expands the formatted string's tokens back to integers.
    fn expand(formatted: &str) -> Vec<u32> {
        if formatted.is_empty() {
            return Vec::new();
        }
        formatted
            .split(", ")
            .flat_map(|token| match token.split_once('–') {
                Some((a, b)) => (a.parse().unwrap()..=b.parse().unwrap()).collect::<Vec<u32>>(),
                None => vec![token.parse().unwrap()],
            })
            .collect()
    }

    #[test]
    fn test_round_trips_back_to_input() {
        let cases: &[&[u32]] = &[
            &[],
            &[0],
            &[1, 2, 3, 7, 8, 10],
            &[1, 3, 5, 7],
            &[10, 11, 12, 13, 14],
            &[0, 1, 5, 6, 7, 100],
        ];
        for values in cases {
            assert_eq!(&expand(&format_ranges(values)), values);
        }
    }
}
