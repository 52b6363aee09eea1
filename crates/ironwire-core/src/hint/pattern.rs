//! Wildcard patterns of pattern hints, parsed with `nom`.
//!
//! A pattern is literal text with `*` placeholders, e.g.
//! `app::*RepositoryInterface`. Each placeholder captures a non-empty run of
//! text inside one path segment (it never spans `::`). Captures are
//! substituted positionally into a target pattern.

use std::fmt;

use ironwire_common::constants::WILDCARD;
use ironwire_common::error::{IronwireError, Result};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, map, value},
    multi::many1,
};

const PATH_SEPARATOR: &str = "::";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard,
}

fn segments(input: &str) -> IResult<&str, Vec<Segment>> {
    let wildcard = value(Segment::Wildcard, char(WILDCARD));
    let literal = map(take_while1(|c: char| c != WILDCARD), |text: &str| {
        Segment::Literal(text.to_owned())
    });
    all_consuming(many1(alt((wildcard, literal)))).parse(input)
}

/// A parsed wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses `input`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty pattern or adjacent placeholders.
    pub fn parse(input: &str) -> Result<Self> {
        let (_, segments) = segments(input).map_err(|e| IronwireError::Config {
            message: format!("invalid wildcard pattern \"{input}\": {e}"),
        })?;
        if segments
            .windows(2)
            .any(|pair| pair[0] == Segment::Wildcard && pair[1] == Segment::Wildcard)
        {
            return Err(IronwireError::Config {
                message: format!("invalid wildcard pattern \"{input}\": adjacent placeholders"),
            });
        }
        Ok(Self {
            raw: input.to_owned(),
            segments,
        })
    }

    /// Number of `*` placeholders.
    #[must_use]
    pub fn placeholders(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Wildcard))
            .count()
    }

    /// Matches `input` and returns the text captured by each placeholder.
    #[must_use]
    pub fn captures<'a>(&self, input: &'a str) -> Option<Vec<&'a str>> {
        let mut captures = Vec::with_capacity(self.placeholders());
        match_from(&self.segments, input, &mut captures).then_some(captures)
    }

    /// Whether `input` matches the pattern.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.captures(input).is_some()
    }

    /// Replaces each placeholder with the capture at the same position.
    ///
    /// Returns `None` if the number of captures differs from the number of
    /// placeholders.
    #[must_use]
    pub fn substitute(&self, captures: &[&str]) -> Option<String> {
        if captures.len() != self.placeholders() {
            return None;
        }
        let mut captures = captures.iter();
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Wildcard => out.push_str(captures.next()?),
            }
        }
        Some(out)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn match_from<'a>(segments: &[Segment], input: &'a str, captures: &mut Vec<&'a str>) -> bool {
    match segments.split_first() {
        None => input.is_empty(),
        Some((Segment::Literal(text), rest)) => input
            .strip_prefix(text.as_str())
            .is_some_and(|tail| match_from(rest, tail, captures)),
        Some((Segment::Wildcard, rest)) => {
            let limit = input.find(PATH_SEPARATOR).unwrap_or(input.len());
            let ends: Vec<usize> = input
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(input.len()))
                .filter(|&end| end > 0 && end <= limit)
                .collect();
            // Longest capture first.
            for end in ends.into_iter().rev() {
                captures.push(&input[..end]);
                if match_from(rest, &input[end..], captures) {
                    return true;
                }
                let _ = captures.pop();
            }
            false
        }
    }
}
