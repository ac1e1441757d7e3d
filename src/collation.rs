use std::cmp::Ordering;

/// Coarse character classes in collation order: punctuation and symbols sort before digits,
/// digits before letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Symbol,
    Digit,
    Letter,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_numeric() {
            CharClass::Digit
        } else if c.is_alphabetic() {
            CharClass::Letter
        } else {
            CharClass::Symbol
        }
    }
}

// ASCII punctuation and symbols in root collation order. Whitespace ranks before all of them,
// anything not listed after all of them.
const SYMBOL_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

fn symbol_rank(c: char) -> usize {
    if c.is_whitespace() {
        return 0;
    }
    match SYMBOL_ORDER.find(c) {
        Some(index) => index + 1,
        None => SYMBOL_ORDER.len() + 1,
    }
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn primary_key(c: char) -> (CharClass, usize, char) {
    let class = CharClass::of(c);
    let rank = match class {
        CharClass::Symbol => symbol_rank(c),
        _ => 0,
    };
    (class, rank, fold_case(c))
}

/// Compares two flag names the way a root-locale collator would, closely enough for display
/// and diffing: symbols by their root collation rank, letters case-insensitively first with
/// lowercase before uppercase on ties, and raw byte order as the last resort.
///
/// The last step makes this a total order, so two distinct names never compare equal.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .map(primary_key)
        .cmp(b.chars().map(primary_key));
    if primary != Ordering::Equal {
        return primary;
    }

    // Same letters ignoring case; the first case difference decides.
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => break,
            }
        }
    }

    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spectral::prelude::*;
    use test_case::test_case;

    #[test_case("a", "b", Ordering::Less)]
    #[test_case("b", "a", Ordering::Greater)]
    #[test_case("a", "a", Ordering::Equal)]
    #[test_case("a", "B", Ordering::Less; "case insensitive before uppercase")]
    #[test_case("B", "c", Ordering::Less)]
    #[test_case("a", "A", Ordering::Less; "lowercase first on ties")]
    #[test_case("Map", "map", Ordering::Greater)]
    #[test_case("ab", "abc", Ordering::Less; "prefix first")]
    #[test_case("_private", "a", Ordering::Less; "symbols before letters")]
    #[test_case("$", "0", Ordering::Less; "symbols before digits")]
    #[test_case("_", "$", Ordering::Less; "underscore before dollar")]
    #[test_case("a_b", "a-b", Ordering::Less; "underscore before hyphen")]
    #[test_case("a-b", "ab", Ordering::Less; "hyphen before letters")]
    #[test_case(" ", "_", Ordering::Less; "whitespace before punctuation")]
    #[test_case("~", "$", Ordering::Less; "dollar after other ascii symbols")]
    #[test_case("$", "\u{a7}", Ordering::Less; "unlisted symbols last")]
    #[test_case("9", "a", Ordering::Less; "digits before letters")]
    #[test_case("z_key_10", "z_key_9", Ordering::Less; "digits are not numeric")]
    #[test_case("Ärger", "ärger", Ordering::Greater; "non ascii letters fold case")]
    fn compares_names(a: &str, b: &str, expected: Ordering) {
        assert_that!(locale_compare(a, b)).is_equal_to(expected);
    }

    #[test]
    fn sorts_mixed_case_names() {
        let mut names = vec!["window", "Window", "Array", "atob", "_", "$", "1x"];
        names.sort_by(|a, b| locale_compare(a, b));
        assert_that!(names).is_equal_to(vec!["_", "$", "1x", "Array", "atob", "window", "Window"]);
    }

    #[test]
    fn sorts_symbol_prefixed_globals() {
        let mut names = vec!["$", "_", "__dirname", "$$", "a-b", "a_b", "ab"];
        names.sort_by(|a, b| locale_compare(a, b));
        assert_that!(names).is_equal_to(vec!["_", "__dirname", "$", "$$", "a_b", "a-b", "ab"]);
    }

    proptest! {
        #[test]
        fn equal_only_for_identical_names(a in ".{0,6}", b in ".{0,6}") {
            prop_assert_eq!(locale_compare(&a, &b) == Ordering::Equal, a == b);
        }

        #[test]
        fn antisymmetric(a in "[a-zA-Z0-9_$ -]{0,6}", b in "[a-zA-Z0-9_$ -]{0,6}") {
            prop_assert_eq!(locale_compare(&a, &b), locale_compare(&b, &a).reverse());
        }

        #[test]
        fn transitive(
            a in "[a-cA-C_1$-]{0,4}",
            b in "[a-cA-C_1$-]{0,4}",
            c in "[a-cA-C_1$-]{0,4}"
        ) {
            if locale_compare(&a, &b) != Ordering::Greater
                && locale_compare(&b, &c) != Ordering::Greater
            {
                prop_assert_ne!(locale_compare(&a, &c), Ordering::Greater);
            }
        }
    }
}
