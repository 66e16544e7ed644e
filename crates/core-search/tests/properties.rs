use core_search::{NavigateDirection, SearchEngine, SearchOptions, find_matches, replace_all_in};
use proptest::prelude::*;

fn doc_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-c .\n]{0,64}").unwrap()
}

fn term_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-c]{1,3}").unwrap()
}

/// Reference count of non-overlapping literal occurrences, scanning left to right.
fn literal_occurrences(doc: &str, term: &str) -> usize {
    doc.match_indices(term).count()
}

proptest! {
    #[test]
    fn blank_terms_never_match(doc in doc_strategy(), blanks in "[ \t]{0,4}") {
        for opts in [SearchOptions::default(), SearchOptions::literal()] {
            prop_assert!(find_matches(&doc, &blanks, &opts).matches.is_empty());
        }
    }

    #[test]
    fn literal_count_matches_reference(doc in doc_strategy(), term in term_strategy()) {
        let result = find_matches(&doc, &term, &SearchOptions::literal());
        prop_assert_eq!(result.matches.len(), literal_occurrences(&doc, &term));
        for m in &result.matches {
            prop_assert_eq!(&m.text, &term);
            prop_assert_eq!(&doc[m.index..m.index + m.length], term.as_str());
        }
        prop_assert!(result.matches.windows(2).all(|w| w[0].index < w[1].index));
    }

    #[test]
    fn replace_all_replaces_every_match(doc in doc_strategy(), term in term_strategy()) {
        let before = find_matches(&doc, &term, &SearchOptions::literal()).matches.len();
        let result = replace_all_in(&doc, &term, "#", &SearchOptions::literal());
        prop_assert_eq!(result.replacement_count, before);
        prop_assert_eq!(result.success, before > 0);
        prop_assert_eq!(result.new_document, doc.replace(term.as_str(), "#"));
    }

    #[test]
    fn next_cycles_back_to_start(doc in doc_strategy(), term in term_strategy(), start in 0usize..8) {
        let mut engine = SearchEngine::new(SearchOptions::literal());
        engine.set_search_term(term, &doc);
        let len = engine.matches().len();
        prop_assume!(len > 0);
        for _ in 0..(start % len) {
            engine.navigate(NavigateDirection::Next);
        }
        let origin = engine.current_match_index();
        for _ in 0..len {
            engine.navigate(NavigateDirection::Next);
        }
        prop_assert_eq!(engine.current_match_index(), origin);
    }
}
