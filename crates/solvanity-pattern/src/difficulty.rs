//! Difficulty estimation for vanity patterns
//!
//! Everything here is advisory. The estimate depends only on pattern length
//! and alphabet size; it never changes how a search runs.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use solvanity_crypto::encoding::{invalid_characters, ALPHABET};

use crate::PatternPosition;

/// Upper bound on [`DifficultyReport::estimated_attempts`], roughly one trillion.
pub const MAX_ESTIMATED_ATTEMPTS: u64 = 999_999_999_999;

const BASE: u128 = 58;
const CONFUSABLE: [char; 4] = ['0', 'O', 'I', 'l'];

/// Coarse difficulty bucket, by pattern length
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl DifficultyLevel {
    pub fn for_length(length: usize) -> Self {
        match length {
            0..=3 => DifficultyLevel::Easy,
            4 => DifficultyLevel::Medium,
            5 => DifficultyLevel::Hard,
            _ => DifficultyLevel::VeryHard,
        }
    }

    /// Human-readable expectation for this level
    pub fn description(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Quick generation (seconds to minutes)",
            DifficultyLevel::Medium => "Moderate generation time (minutes to hours)",
            DifficultyLevel::Hard => "Long generation time (hours to days)",
            DifficultyLevel::VeryHard => "Very long generation time (days to weeks)",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Easy => write!(f, "easy"),
            DifficultyLevel::Medium => write!(f, "medium"),
            DifficultyLevel::Hard => write!(f, "hard"),
            DifficultyLevel::VeryHard => write!(f, "very-hard"),
        }
    }
}

/// Result of [`analyze`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyReport {
    pub level: DifficultyLevel,
    pub estimated_attempts: u64,
    pub tips: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Analyze a pattern and produce user guidance.
///
/// `characters` is taken as typed, so invalid symbols are reported as tips
/// instead of rejected.
pub fn analyze(characters: &str, position: PatternPosition, length: usize) -> DifficultyReport {
    let mut tips = Vec::new();
    let mut suggestions = Vec::new();

    let invalid = invalid_characters(characters);
    if !invalid.is_empty() {
        let listed: Vec<String> = invalid.iter().map(|c| c.to_string()).collect();
        tips.push(format!(
            "Invalid characters detected: {}. These can never appear in an address.",
            listed.join(", ")
        ));
    }

    if characters.chars().any(|c| CONFUSABLE.contains(&c)) {
        tips.push(
            "Base58 excludes 0 (zero), O (capital o), I (capital i) and l (lowercase L) to avoid confusion."
                .to_string(),
        );
        suggestions.push("Try similar-looking alternatives like 1, o, i or L instead.".to_string());
    }

    let has_upper = characters.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = characters.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = characters.chars().any(|c| c.is_ascii_digit());

    if has_upper != has_lower && !has_digit {
        let casing = if has_upper { "uppercase" } else { "lowercase" };
        tips.push(format!(
            "All-{} patterns match only that exact casing; base58 is case-sensitive.",
            casing
        ));
        suggestions.push(
            "If several casings would satisfy you, pick any one: every casing of the same length is equally likely."
                .to_string(),
        );
    }

    if length >= 5 {
        tips.push("Patterns of 5 or more characters can take hours or even days.".to_string());
        suggestions.push("Start with shorter patterns (3-4 characters) for quicker results.".to_string());
    } else if length == 4 {
        tips.push("4-character patterns typically take several minutes to hours.".to_string());
        suggestions.push("Be patient, or try a 3-character pattern for faster generation.".to_string());
    } else if length == 3 {
        tips.push("3-character patterns usually generate within seconds to minutes.".to_string());
    }

    if position == PatternPosition::Suffix {
        tips.push("Suffix patterns take the same time as prefix patterns of equal length.".to_string());
    }

    let mut chars = characters.chars();
    let repetitive = characters.chars().count() >= 2
        && chars
            .next()
            .map_or(false, |first| chars.all(|c| c == first));
    if repetitive {
        tips.push(
            "Repeated characters (like \"aaa\" or \"111\") are no harder than any other pattern of the same length."
                .to_string(),
        );
        suggestions.push(
            "Odds depend only on length, not on which characters you choose, so feel free to be creative."
                .to_string(),
        );
    }

    if tips.is_empty() {
        tips.push("Your pattern looks good. Generation time depends on your device's performance.".to_string());
    }
    if suggestions.is_empty() {
        suggestions.push(
            "You can retry with the same pattern or shorten it to make it easier to find.".to_string(),
        );
    }

    DifficultyReport {
        level: DifficultyLevel::for_length(length),
        estimated_attempts: capped_attempts(length),
        tips,
        suggestions,
    }
}

/// floor(58^length / 2), capped at [`MAX_ESTIMATED_ATTEMPTS`]
fn capped_attempts(length: usize) -> u64 {
    u32::try_from(length)
        .ok()
        .and_then(|len| BASE.checked_pow(len))
        .map(|space| space / 2)
        .and_then(|half| u64::try_from(half).ok())
        .map_or(MAX_ESTIMATED_ATTEMPTS, |n| n.min(MAX_ESTIMATED_ATTEMPTS))
}

/// Number of equally likely strings of `length` base58 symbols
pub fn search_space(length: usize) -> f64 {
    (ALPHABET.len() as f64).powi(length.min(i32::MAX as usize) as i32)
}

/// Expected attempts for a 50% chance of success, uncapped
pub fn expected_attempts(length: usize) -> f64 {
    search_space(length) / 2.0
}

/// Expected wall time to reach [`expected_attempts`] at `rate` attempts/s.
///
/// Returns `None` when no rate is known yet or the time does not fit a `Duration`.
pub fn estimate_time(length: usize, rate: f64) -> Option<Duration> {
    if !(rate.is_finite() && rate > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(expected_attempts(length) / rate).ok()
}

/// Format an elapsed duration: `"2h 5m"`, `"3m 7s"`, `"12s"`
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Format a count with a metric suffix
pub fn format_count(count: f64) -> String {
    if count >= 1e12 {
        format!("{:.2}T", count / 1e12)
    } else if count >= 1e9 {
        format!("{:.2}G", count / 1e9)
    } else if count >= 1e6 {
        format!("{:.2}M", count / 1e6)
    } else if count >= 1e3 {
        format!("{:.2}K", count / 1e3)
    } else {
        format!("{:.0}", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_attempts() {
        assert_eq!(analyze("a", PatternPosition::Prefix, 1).estimated_attempts, 29);
        assert_eq!(analyze("abc", PatternPosition::Prefix, 3).estimated_attempts, 97_556);
        assert_eq!(analyze("abcd", PatternPosition::Prefix, 4).estimated_attempts, 5_658_248);
    }

    #[test]
    fn test_length_four_is_58_times_length_three() {
        for (three, four) in [("abc", "abcd"), ("111", "1111"), ("ZZZ", "Zzz9")] {
            let a = analyze(three, PatternPosition::Prefix, 3).estimated_attempts;
            let b = analyze(four, PatternPosition::Suffix, 4).estimated_attempts;
            assert_eq!(b, a * 58);
        }
    }

    #[test]
    fn test_estimate_capped() {
        assert_eq!(analyze("abcdefg", PatternPosition::Prefix, 7).estimated_attempts, MAX_ESTIMATED_ATTEMPTS);
        assert_eq!(analyze("x", PatternPosition::Prefix, 500).estimated_attempts, MAX_ESTIMATED_ATTEMPTS);
    }

    #[test]
    fn test_levels() {
        assert_eq!(DifficultyLevel::for_length(1), DifficultyLevel::Easy);
        assert_eq!(DifficultyLevel::for_length(3), DifficultyLevel::Easy);
        assert_eq!(DifficultyLevel::for_length(4), DifficultyLevel::Medium);
        assert_eq!(DifficultyLevel::for_length(5), DifficultyLevel::Hard);
        assert_eq!(DifficultyLevel::for_length(6), DifficultyLevel::VeryHard);
        assert_eq!(DifficultyLevel::for_length(12), DifficultyLevel::VeryHard);
    }

    #[test]
    fn test_flags_excluded_characters() {
        let report = analyze("S0l", PatternPosition::Prefix, 3);
        assert!(report.tips[0].contains("0, l"));
        assert!(report.tips.iter().any(|t| t.contains("Base58 excludes")));
        assert!(report.suggestions.iter().any(|s| s.contains("1, o, i or L")));
    }

    #[test]
    fn test_repetition_is_not_harder() {
        let repeated = analyze("aaaa", PatternPosition::Prefix, 4);
        let mixed = analyze("abcd", PatternPosition::Prefix, 4);
        assert_eq!(repeated.estimated_attempts, mixed.estimated_attempts);
        assert!(repeated.tips.iter().any(|t| t.contains("no harder")));
        assert!(!mixed.tips.iter().any(|t| t.contains("no harder")));
    }

    #[test]
    fn test_case_homogeneity_tip() {
        assert!(analyze("ABC", PatternPosition::Prefix, 3)
            .tips
            .iter()
            .any(|t| t.contains("All-uppercase")));
        assert!(analyze("abc", PatternPosition::Prefix, 3)
            .tips
            .iter()
            .any(|t| t.contains("All-lowercase")));
        assert!(!analyze("aBc", PatternPosition::Prefix, 3)
            .tips
            .iter()
            .any(|t| t.contains("All-")));
    }

    #[test]
    fn test_fallback_guidance() {
        let report = analyze("9z", PatternPosition::Prefix, 2);
        assert_eq!(report.tips.len(), 1);
        assert_eq!(report.suggestions.len(), 1);
    }

    #[test]
    fn test_suffix_tip() {
        let report = analyze("Sol", PatternPosition::Suffix, 3);
        assert!(report.tips.iter().any(|t| t.starts_with("Suffix patterns")));
    }

    #[test]
    fn test_report_serializes_level_kebab_case() {
        let report = analyze("abcdefg", PatternPosition::Prefix, 7);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["level"], "very-hard");
        assert_eq!(json["estimatedAttempts"], MAX_ESTIMATED_ATTEMPTS);
    }

    #[test]
    fn test_estimate_time() {
        assert_eq!(estimate_time(2, 0.0), None);
        // 58^2 / 2 = 1682 attempts at 1682/s
        assert_eq!(estimate_time(2, 1682.0), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(999)), "0s");
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(187)), "3m 7s");
        assert_eq!(format_duration(Duration::from_secs(7500)), "2h 5m");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1500.0), "1.50K");
        assert_eq!(format_count(1_500_000.0), "1.50M");
        assert_eq!(format_count(1e12), "1.00T");
    }
}
