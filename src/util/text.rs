use std::borrow::Cow;

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
/// Characters consumed by the ellipsis
const ELLIPSIS_CHARS: usize = 3;

/// Truncates a string to at most `max_chars` characters.
///
/// If truncation is necessary, the result holds `max_chars - 3` characters
/// followed by `"..."`, so the total never exceeds `max_chars`. Truncation
/// happens on character boundaries, never mid-codepoint.
///
/// Returns `Cow::Borrowed` when the input already fits (no allocation).
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    if max_chars == 0 {
        return Cow::Borrowed("");
    }

    // Too narrow for text plus ellipsis: keep what fits, drop the marker.
    if max_chars <= ELLIPSIS_CHARS {
        return match s.char_indices().nth(max_chars) {
            Some((idx, _)) => Cow::Owned(s[..idx].to_string()),
            None => Cow::Borrowed(s),
        };
    }

    let keep = max_chars - ELLIPSIS_CHARS;
    let mut char_count = 0;
    let mut cut_byte = 0;
    for (idx, _) in s.char_indices() {
        if char_count == keep {
            cut_byte = idx;
        }
        char_count += 1;
        if char_count > max_chars {
            let mut out = String::with_capacity(cut_byte + ELLIPSIS.len());
            out.push_str(&s[..cut_byte]);
            out.push_str(ELLIPSIS);
            return Cow::Owned(out);
        }
    }

    Cow::Borrowed(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_string_borrowed_unchanged() {
        let result = truncate_chars("short", 500);
        assert_eq!(result, "short");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_exact_length_not_truncated() {
        let s = "a".repeat(500);
        assert_eq!(truncate_chars(&s, 500), s.as_str());
    }

    #[test]
    fn test_long_string_cut_to_497_plus_ellipsis() {
        let s = "a".repeat(501);
        let result = truncate_chars(&s, 500);
        assert_eq!(result.chars().count(), 500);
        assert!(result.ends_with("..."));
        assert_eq!(&result[..497], &s[..497]);
    }

    #[test]
    fn test_multibyte_boundary_safe() {
        let s = "é".repeat(600);
        let result = truncate_chars(&s, 500);
        assert_eq!(result.chars().count(), 500);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_zero_width_returns_empty() {
        assert_eq!(truncate_chars("anything", 0), "");
    }
}
