//! Subcommand implementations.

pub mod search;
pub mod update;

use std::collections::BTreeSet;

/// Split a comma-separated language option into a set of codes.
pub(crate) fn parse_languages(raw: Option<&str>) -> Option<BTreeSet<String>> {
    let raw = raw?;
    let languages: BTreeSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect();

    if languages.is_empty() {
        None
    } else {
        Some(languages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_languages_splits_and_trims() {
        let languages = parse_languages(Some("eng, fra ,deu")).unwrap();
        let expected: BTreeSet<String> =
            ["deu", "eng", "fra"].iter().map(|l| l.to_string()).collect();
        assert_eq!(languages, expected);
    }

    #[test]
    fn test_parse_languages_empty_input() {
        assert!(parse_languages(None).is_none());
        assert!(parse_languages(Some("")).is_none());
        assert!(parse_languages(Some(" , ,")).is_none());
    }
}
