//! Complexity classification from Tweaker3's verbose report.

use printquote_entity::quote::Complexity;

/// Classify model complexity from Tweaker3 output.
///
/// Uses the `Unprintability: <score>` line when present, otherwise the first
/// `Support ... <p>%` figure, otherwise [`Complexity::Medium`].
pub fn parse_complexity(output: &str) -> Complexity {
    if let Some(score) = unprintability(output) {
        return Complexity::from_unprintability(score);
    }
    if let Some(percent) = support_percent(output) {
        return Complexity::from_support_percent(percent);
    }
    Complexity::Medium
}

fn unprintability(output: &str) -> Option<f64> {
    const LABEL: &str = "Unprintability:";
    output.lines().find_map(|line| {
        let start = line.find(LABEL)? + LABEL.len();
        let rest = line[start..].trim_start();
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    })
}

fn support_percent(output: &str) -> Option<f64> {
    output.lines().find_map(|line| {
        let lower = line.to_ascii_lowercase();
        lower
            .match_indices("support")
            .find_map(|(at, word)| percent_after(&line[at + word.len()..]))
    })
}

/// First run of digits and dots directly followed by `%`.
fn percent_after(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() || bytes[i] == b'.' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            if bytes.get(i) == Some(&b'%') {
                if let Ok(value) = text[start..i].parse() {
                    return Some(value);
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unprintability_takes_precedence() {
        let output = "Support volume 40%\nResult-stats:\n  Unprintability: 3.2\n";
        assert_eq!(parse_complexity(output), Complexity::Low);
    }

    #[test]
    fn test_support_percentage_fallback() {
        assert_eq!(
            parse_complexity("Estimated support area: 12.5% of surface"),
            Complexity::Medium
        );
        assert_eq!(parse_complexity("SUPPORT needed 30%"), Complexity::High);
    }

    #[test]
    fn test_default_is_medium() {
        assert_eq!(parse_complexity("nothing useful"), Complexity::Medium);
        assert_eq!(parse_complexity("Support required"), Complexity::Medium);
    }

    #[test]
    fn test_high_unprintability() {
        assert_eq!(parse_complexity("Unprintability: 22"), Complexity::High);
    }
}
