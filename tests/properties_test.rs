//! Property-based tests for the universal scanner invariants.

mod common;

use common::ChunkedSource;
use hls_scanner::{scan_text, Scanner, ScannerOptions, TextSource, Token, TokenType};
use proptest::prelude::*;

fn verbose_tokens(input: &str) -> Vec<Token> {
    scan_text(input, ScannerOptions::new().with_verbose(true)).unwrap()
}

fn quiet_tokens(input: &str) -> Vec<Token> {
    scan_text(input, ScannerOptions::new()).unwrap()
}

/// Alphabet weighted toward the characters the state machine dispatches on.
const HLS_FLAVORED: &str = "[A-Z0-9a-z#:=,\\- \t\r\n\"\\.]{0,300}";

proptest! {
    // Verbose tokens tile the input exactly: concatenating every value in
    // order reproduces the input verbatim
    #[test]
    fn concatenation_is_exact_when_verbose(input in HLS_FLAVORED) {
        let joined: String = verbose_tokens(&input)
            .iter()
            .map(|token| token.value.as_str())
            .collect();
        prop_assert_eq!(joined, input);
    }

    #[test]
    fn concatenation_is_exact_for_arbitrary_unicode(input in any::<String>()) {
        let joined: String = verbose_tokens(&input)
            .iter()
            .map(|token| token.value.as_str())
            .collect();
        prop_assert_eq!(joined, input);
    }

    // Quiet mode is exactly verbose mode with structural tokens filtered out
    #[test]
    fn quiet_equals_filtered_verbose(input in HLS_FLAVORED) {
        let filtered: Vec<Token> = verbose_tokens(&input)
            .into_iter()
            .filter(|token| !token.is_structural())
            .collect();
        let quiet = quiet_tokens(&input);
        for token in &quiet {
            prop_assert!(
                token.token_type.is_substantive()
                    || token.token_type == TokenType::UnexpectedData
            );
        }
        prop_assert_eq!(quiet, filtered);
    }

    // Every token starts exactly where the previous one ended; walking the
    // values with the newline rule reproduces every start mark
    #[test]
    fn token_marks_tile_the_input(input in HLS_FLAVORED) {
        let mut line = 1usize;
        let mut column = 1usize;
        for token in verbose_tokens(&input) {
            prop_assert_eq!((token.start.line, token.start.column), (line, column));
            for ch in token.value.chars() {
                if ch == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
        }
    }

    // Marks never go backwards, in either mode
    #[test]
    fn marks_are_monotonic(input in HLS_FLAVORED) {
        for tokens in [verbose_tokens(&input), quiet_tokens(&input)] {
            let mut previous = (1usize, 1usize);
            for token in tokens {
                let mark = (token.start.line, token.start.column);
                prop_assert!(mark >= previous, "mark {:?} after {:?}", mark, previous);
                previous = mark;
            }
        }
    }

    // Zero-length values are confined to the kinds that may legitimately
    // cover nothing; every other kind spans at least one character
    #[test]
    fn zero_length_tokens_are_restricted(input in HLS_FLAVORED) {
        for tokens in [verbose_tokens(&input), quiet_tokens(&input)] {
            for token in tokens {
                if token.value.is_empty() {
                    prop_assert!(
                        matches!(
                            token.token_type,
                            TokenType::Uri
                                | TokenType::TagValue
                                | TokenType::AttributeValue
                                | TokenType::EndOfFile
                        ),
                        "zero-length {:?}",
                        token.token_type
                    );
                }
            }
        }
    }

    // Drain terminates with a bounded token count
    #[test]
    fn token_count_is_bounded(input in HLS_FLAVORED) {
        let count = verbose_tokens(&input).len();
        prop_assert!(count <= 4 * input.chars().count() + 2);
    }

    // Lines advance exactly once per LF; a lone CR never advances
    #[test]
    fn line_count_matches_line_feeds(input in HLS_FLAVORED) {
        let mut scanner = Scanner::new(TextSource::new(input.as_str()));
        scanner.drain().unwrap();
        let line_feeds = input.chars().filter(|&ch| ch == '\n').count();
        prop_assert_eq!(scanner.line(), line_feeds + 1);
    }

    // The stream ends with exactly one EndOfFile token
    #[test]
    fn end_of_file_is_emitted_once(input in HLS_FLAVORED) {
        let tokens = verbose_tokens(&input);
        let count = tokens
            .iter()
            .filter(|token| token.token_type == TokenType::EndOfFile)
            .count();
        prop_assert_eq!(count, 1);
        prop_assert_eq!(tokens.last().map(|token| token.token_type), Some(TokenType::EndOfFile));
    }

    // Token boundaries are independent of how the source chops its reads
    #[test]
    fn chunked_delivery_is_equivalent(input in HLS_FLAVORED, chunk in 1usize..9) {
        let whole = verbose_tokens(&input);
        let mut scanner = Scanner::with_options(
            ChunkedSource::new(&input, chunk),
            ScannerOptions::new().with_verbose(true),
        );
        prop_assert_eq!(scanner.drain().unwrap(), whole);
    }
}
