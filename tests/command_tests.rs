//! Tests for the `/emit` command grammar and its two address gates.

use chrono::NaiveDate;
use metricbridge::command::{CommandParser, ParseOutcome};

const MENTION: &str = "@metricemitter_bot";

fn parser() -> CommandParser {
    CommandParser::new(MENTION).unwrap()
}

#[test]
fn test_full_command_parses() {
    let p = parser();
    let text = "/emit temperature sensor1 March 5, 2024 at 2:30PM @metricemitter_bot";
    assert!(p.is_addressed(text));

    match p.parse(text) {
        ParseOutcome::Parsed(cmd) => {
            assert_eq!(cmd.metric_name, "temperature");
            assert_eq!(cmd.field, "sensor1");
            assert_eq!(
                cmd.timestamp.naive_local(),
                NaiveDate::from_ymd_opt(2024, 3, 5)
                    .unwrap()
                    .and_hms_opt(14, 30, 0)
                    .unwrap()
            );
        }
        other => panic!("expected Parsed, got {other:?}"),
    }
}

#[test]
fn test_trailing_chatter_is_tolerated() {
    let p = parser();
    let text = "/emit temperature sensor1 March 5, 2024 at 2:30PM please @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::Parsed(_)));
}

#[test]
fn test_missing_timestamp_is_malformed() {
    let p = parser();
    let text = "/emit foo bar @metricemitter_bot";
    assert!(p.is_addressed(text));
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_misspelled_month_is_malformed() {
    // The month is part of the grammar alternation, so this never reaches
    // the normalizer.
    let p = parser();
    let text = "/emit foo bar Marchh 5, 2024 at 2:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_lowercase_month_is_malformed() {
    let p = parser();
    let text = "/emit foo bar march 5, 2024 at 2:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_hour_above_twelve_is_malformed() {
    let p = parser();
    let text = "/emit foo bar March 5, 2024 at 13:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_minute_out_of_range_is_malformed() {
    let p = parser();
    let text = "/emit foo bar March 5, 2024 at 2:61PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_lowercase_meridiem_is_malformed() {
    let p = parser();
    let text = "/emit foo bar March 5, 2024 at 2:30pm @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_punctuated_metric_name_is_malformed() {
    let p = parser();
    let text = "/emit foo-bar baz March 5, 2024 at 2:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_double_space_is_malformed() {
    let p = parser();
    let text = "/emit  foo bar March 5, 2024 at 2:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_extra_token_before_timestamp_is_malformed() {
    let p = parser();
    let text = "/emit foo bar extra March 5, 2024 at 2:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::MalformedSyntax));
}

#[test]
fn test_valid_grammar_with_impossible_day_is_invalid_timestamp() {
    let p = parser();
    let text = "/emit foo bar February 30, 2024 at 2:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::InvalidTimestamp(_)));
}

#[test]
fn test_day_32_is_invalid_timestamp() {
    let p = parser();
    let text = "/emit foo bar March 32, 2024 at 2:30PM @metricemitter_bot";
    assert!(matches!(p.parse(text), ParseOutcome::InvalidTimestamp(_)));
}

#[test]
fn test_without_mention_not_addressed() {
    let p = parser();
    let text = "/emit temperature sensor1 March 5, 2024 at 2:30PM";
    assert!(!p.is_addressed(text));
}

#[test]
fn test_without_prefix_not_addressed() {
    let p = parser();
    assert!(!p.is_addressed("emit temperature sensor1 @metricemitter_bot"));
    assert!(!p.is_addressed("hello @metricemitter_bot"));
    // The prefix gate anchors at the start of the message.
    assert!(!p.is_addressed(" /emit temperature sensor1 @metricemitter_bot"));
}

#[test]
fn test_mention_anywhere_satisfies_the_gate() {
    let p = parser();
    assert!(p.is_addressed("/emit a b @metricemitter_bot trailing"));
    assert!(p.is_addressed("/emit a b c @metricemitter_bot"));
}

#[test]
fn test_underscored_tokens_parse() {
    let p = parser();
    let text = "/emit cpu_load core_0 March 5, 2024 at 2:30PM @metricemitter_bot";
    match p.parse(text) {
        ParseOutcome::Parsed(cmd) => {
            assert_eq!(cmd.metric_name, "cpu_load");
            assert_eq!(cmd.field, "core_0");
        }
        other => panic!("expected Parsed, got {other:?}"),
    }
}
