//! Spoken-text normalization
//!
//! Rewrites spoken symbol phrases ("divided by", "at the rate") and number
//! words ("five", "twenty") into the literal characters a calculation or a
//! typing command expects.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// Spoken phrases and the symbol each one stands for.
const SYMBOL_PHRASES: &[(&str, &str)] = &[
    ("at the rate", "@"),
    ("hash tag", "#"),
    ("hash", "#"),
    ("dollar sign", "$"),
    ("percent sign", "%"),
    ("ampersand", "&"),
    ("asterisk", "*"),
    ("star", "*"),
    ("plus", "+"),
    ("minus", "-"),
    ("hyphen", "-"),
    ("dash", "-"),
    ("slash", "/"),
    ("divided by", "/"),
    ("backslash", "\\"),
    ("equals", "="),
    ("colon", ":"),
    ("semicolon", ";"),
    ("quote", "'"),
    ("double quote", "\""),
    ("single quote", "'"),
    ("open parenthesis", "("),
    ("close parenthesis", ")"),
    ("left parenthesis", "("),
    ("right parenthesis", ")"),
    ("square bracket open", "["),
    ("square bracket close", "]"),
    ("curly bracket open", "{"),
    ("curly bracket close", "}"),
    ("less than", "<"),
    ("greater than", ">"),
    ("comma", ","),
    ("dot", "."),
    ("period", "."),
    ("question mark", "?"),
    ("exclamation mark", "!"),
    ("underscore", "_"),
    ("tilde", "~"),
    ("caret", "^"),
    ("pipe", "|"),
    ("and", "&"),
    ("number sign", "#"),
    ("exclamation point", "!"),
    ("full stop", "."),
    ("new line", "\n"),
    ("new paragraph", "\n\n"),
    ("tab", "\t"),
];

/// Number words and their digit spelling. "hundred" becomes "00" so that
/// "five hundred" reads as "5 00".
const NUMBER_WORDS: &[(&str, &str)] = &[
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("ten", "10"),
    ("eleven", "11"),
    ("twelve", "12"),
    ("thirteen", "13"),
    ("fourteen", "14"),
    ("fifteen", "15"),
    ("sixteen", "16"),
    ("seventeen", "17"),
    ("eighteen", "18"),
    ("nineteen", "19"),
    ("twenty", "20"),
    ("thirty", "30"),
    ("forty", "40"),
    ("fifty", "50"),
    ("sixty", "60"),
    ("seventy", "70"),
    ("eighty", "80"),
    ("ninety", "90"),
    ("hundred", "00"),
];

/// Symbol rules, longest phrase first so "hash tag" wins over "hash".
static SYMBOL_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    let mut phrases = SYMBOL_PHRASES.to_vec();
    phrases.sort_by_key(|(phrase, _)| std::cmp::Reverse(phrase.len()));
    phrases
        .into_iter()
        .map(|(phrase, symbol)| (whole_word(phrase), symbol))
        .collect()
});

static NUMBER_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    NUMBER_WORDS
        .iter()
        .map(|&(word, digits)| (whole_word(word), digits))
        .collect()
});

fn whole_word(phrase: &str) -> Regex {
    Regex::new(&format!(r"\b{}\b", regex::escape(phrase))).expect("static phrase pattern")
}

/// Normalize a raw transcript into its canonical text form.
///
/// Symbol phrases are fully substituted before number words are touched.
/// Both passes match whole words only, so "phone" keeps its "one" and
/// "standard" keeps its "and".
pub fn normalize(raw: &str) -> String {
    let mut text = raw.to_lowercase();

    for (pattern, symbol) in SYMBOL_RULES.iter() {
        text = pattern.replace_all(&text, NoExpand(symbol)).into_owned();
    }

    for (pattern, digits) in NUMBER_RULES.iter() {
        text = pattern.replace_all(&text, NoExpand(digits)).into_owned();
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_phrase() {
        assert_eq!(normalize("five plus three"), "5 + 3");
        assert_eq!(normalize("Ten DIVIDED BY two"), "10 / 2");
    }

    #[test]
    fn test_longest_phrase_wins() {
        assert_eq!(normalize("hash tag"), "#");
        assert_eq!(normalize("hash"), "#");
        assert_eq!(normalize("double quote"), "\"");
    }

    #[test]
    fn test_number_words_are_whole_words() {
        assert_eq!(normalize("my phone number"), "my phone number");
        assert_eq!(normalize("often"), "often");
        assert_eq!(normalize("one two"), "1 2");
    }

    #[test]
    fn test_symbol_phrases_are_whole_words() {
        assert_eq!(normalize("standard"), "standard");
        assert_eq!(normalize("table"), "table");
    }

    #[test]
    fn test_email_dictation() {
        assert_eq!(
            normalize("john at the rate example dot com"),
            "john @ example . com"
        );
    }

    #[test]
    fn test_special_replacement_characters_are_literal() {
        assert_eq!(normalize("dollar sign five"), "$ 5");
        assert_eq!(normalize("backslash"), "\\");
    }

    #[test]
    fn test_layout_phrases() {
        assert_eq!(normalize("hello new line world"), "hello \n world");
        assert_eq!(normalize("a new paragraph b"), "a \n\n b");
    }

    #[test]
    fn test_hundred() {
        assert_eq!(normalize("five hundred"), "5 00");
    }

    #[test]
    fn test_idempotent_on_substituted_output() {
        for input in ["5 + 3", "# @ . com", "10 / (2 - 1)", "$ 5 * 2"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }
}
