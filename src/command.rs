//! The `/emit` command grammar.

use anyhow::Result;
use regex::Regex;

use crate::timestamp::{self, TimestampError};
use crate::types::ParsedCommand;

pub const COMMAND_PREFIX: &str = "/emit";

/// Single literal spaces between tokens; the time of day is strictly
/// 12-hour to stay parseable by the normalizer's layout. The pattern is
/// searched, not anchored, so the command may sit inside a longer message
/// as long as the message itself starts with the prefix.
const COMMAND_GRAMMAR: &str = r"/emit (\w+) (\w+) ((?:January|February|March|April|May|June|July|August|September|October|November|December) \d{1,2}, \d{4} at (?:0?[1-9]|1[0-2]):[0-5][0-9](?:AM|PM))";

/// Outcome of one parse attempt. The two failure kinds are mutually
/// exclusive: a grammar miss never reaches the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(ParsedCommand),
    MalformedSyntax,
    InvalidTimestamp(TimestampError),
}

#[derive(Debug, Clone)]
pub struct CommandParser {
    grammar: Regex,
    mention: String,
}

impl CommandParser {
    pub fn new(mention: &str) -> Result<Self> {
        Ok(Self {
            grammar: Regex::new(COMMAND_GRAMMAR)?,
            mention: mention.to_string(),
        })
    }

    /// The two address gates: command prefix at the start, mention token
    /// anywhere. Plain text checks, independent of the grammar.
    pub fn is_addressed(&self, text: &str) -> bool {
        text.starts_with(COMMAND_PREFIX) && text.contains(&self.mention)
    }

    /// Apply the grammar to the whole message. Exactly three captured
    /// groups make a candidate command; the timestamp text then has to
    /// survive normalization.
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let Some(caps) = self.grammar.captures(text) else {
            return ParseOutcome::MalformedSyntax;
        };
        let (Some(metric_name), Some(field), Some(stamp)) =
            (caps.get(1), caps.get(2), caps.get(3))
        else {
            return ParseOutcome::MalformedSyntax;
        };

        match timestamp::normalize(stamp.as_str()) {
            Ok(ts) => ParseOutcome::Parsed(ParsedCommand {
                metric_name: metric_name.as_str().to_string(),
                field: field.as_str().to_string(),
                timestamp: ts,
            }),
            Err(err) => ParseOutcome::InvalidTimestamp(err),
        }
    }
}
