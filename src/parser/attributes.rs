//! Mini-grammars for the text inside attribute blocks.
//!
//! All three operate on a block's raw text after the tokenizer has already
//! unescaped `\{`, `\}` and `\\`.

use crate::ast::Pair;

/// Split on commas that are not inside a double-quoted span.
/// Quote characters stay in the segments.
fn split_unquoted_commas(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&text[start..]);

    segments
}

/// `key: value, key: value` lists used by `props`, `dataset` and `styles`.
///
/// Each non-blank segment is split on its first colon; a segment without a
/// colon becomes a key with an empty value. Duplicate keys are kept.
pub fn parse_key_values(text: &str) -> Vec<Pair> {
    split_unquoted_commas(text)
        .into_iter()
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| match segment.split_once(':') {
            Some((key, value)) => Pair::new(key.trim(), value.trim()),
            None => Pair::new(segment.trim(), ""),
        })
        .collect()
}

/// `a, "b,c", d` lists used by `classes` and `ids`.
pub fn parse_list(text: &str) -> Vec<String> {
    split_unquoted_commas(text)
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| unquote(item).to_string())
        .collect()
}

/// Content text: `\,` becomes `,`, everything else is verbatim.
pub fn parse_content(text: &str) -> String {
    text.replace("\\,", ",")
}

/// Strip one layer of surrounding double quotes.
fn unquote(item: &str) -> &str {
    if item.len() >= 2 {
        if let Some(inner) = item.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            return inner;
        }
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values() {
        let pairs = parse_key_values(" href : /home , target:_blank ");
        assert_eq!(pairs, vec![Pair::new("href", "/home"), Pair::new("target", "_blank")]);
    }

    #[test]
    fn test_key_value_splits_on_first_colon_only() {
        let pairs = parse_key_values("href: https://example.com:8080/x");
        assert_eq!(pairs, vec![Pair::new("href", "https://example.com:8080/x")]);
    }

    #[test]
    fn test_key_value_keeps_quotes_and_quoted_commas() {
        let pairs = parse_key_values(r#"font-family: "Helvetica, Arial", color: red"#);
        assert_eq!(
            pairs,
            vec![
                Pair::new("font-family", r#""Helvetica, Arial""#),
                Pair::new("color", "red"),
            ]
        );
    }

    #[test]
    fn test_key_value_duplicates_and_blanks() {
        let pairs = parse_key_values("a: 1, , a: 2,");
        assert_eq!(pairs, vec![Pair::new("a", "1"), Pair::new("a", "2")]);
    }

    #[test]
    fn test_key_without_colon() {
        assert_eq!(parse_key_values("disabled"), vec![Pair::new("disabled", "")]);
    }

    #[test]
    fn test_list_with_quoted_comma() {
        assert_eq!(parse_list(r#""a,b", c"#), vec!["a,b", "c"]);
    }

    #[test]
    fn test_list_trims_and_skips_blanks() {
        assert_eq!(parse_list(" card ,, wide ,"), vec!["card", "wide"]);
    }

    #[test]
    fn test_unquote_needs_a_pair() {
        assert_eq!(parse_list(r#"""#), vec![r#"""#]);
        assert_eq!(parse_list(r#""""#), vec![""]);
    }

    #[test]
    fn test_content_unescapes_commas_only() {
        assert_eq!(parse_content(r"a\,b"), "a,b");
        assert_eq!(parse_content("a, b: c"), "a, b: c");
        assert_eq!(parse_content(r"tab\t"), r"tab\t");
    }
}
