//! Parsers for the `[%...]` tag micro-format inside PGN comments.
//!
//! Analysis tools embed evaluation, mate and clock tags in brace comments,
//! e.g. `{ [%eval 0.17] [%clk 0:03:00] a fine move }`. The tree keeps the
//! comment text verbatim for round-tripping; these parsers only extract
//! the evaluation tags that feed the per-node score cache.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, recognize},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use crate::tree::Score;

/// One recognized `[%...]` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedTag {
    Eval(f64),
    Mate(i32),
    Clk {
        hours: u32,
        minutes: u32,
        seconds: u32,
    },
}

/// A comment split into tags and plain-text runs.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentContent {
    Tag(ParsedTag),
    Text(String),
}

pub fn parse_comments(input: &str) -> IResult<&str, Vec<CommentContent>> {
    many0(alt((
        map(tag_parser, CommentContent::Tag),
        map(text, |s: &str| CommentContent::Text(s.to_string())),
    )))
    .parse(input)
}

/// First evaluation-bearing tag in a comment, if any.
pub fn extract_score(comment: &str) -> Option<Score> {
    let (_, contents) = parse_comments(comment).ok()?;
    contents.into_iter().find_map(|content| match content {
        CommentContent::Tag(ParsedTag::Eval(value)) => Some(Score::Eval(value)),
        CommentContent::Tag(ParsedTag::Mate(value)) => Some(Score::Mate(value)),
        _ => None,
    })
}

/// Parser for a tag
fn tag_parser(input: &str) -> IResult<&str, ParsedTag> {
    delimited(
        (char('['), char('%')),
        alt((eval_tag, mate_tag, clk_tag)),
        char(']'),
    )
    .parse(input)
}

fn eval_tag(input: &str) -> IResult<&str, ParsedTag> {
    map_res(
        preceded((tag("eval"), spacing), signed_number),
        |value: &str| value.parse::<f64>().map(ParsedTag::Eval),
    )
    .parse(input)
}

fn mate_tag(input: &str) -> IResult<&str, ParsedTag> {
    map_res(
        preceded((tag("mate"), spacing), signed_integer),
        |value: &str| value.parse::<i32>().map(ParsedTag::Mate),
    )
    .parse(input)
}

fn clk_tag(input: &str) -> IResult<&str, ParsedTag> {
    map_res(
        preceded(
            (tag("clk"), spacing),
            (digit1, char(':'), digit1, char(':'), digit1),
        ),
        |(h, _, m, _, s): (&str, char, &str, char, &str)| {
            Ok::<_, std::num::ParseIntError>(ParsedTag::Clk {
                hours: h.parse()?,
                minutes: m.parse()?,
                seconds: s.parse()?,
            })
        },
    )
    .parse(input)
}

/// Parser for a signed number
fn signed_number(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        opt(alt((char('+'), char('-')))),
        pair(digit1, opt(preceded(char('.'), digit1))),
    ))
    .parse(input)
}

/// Parser for a signed integer
fn signed_integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(alt((char('+'), char('-')))), digit1)).parse(input)
}

/// Parser for text (any characters except '[' and ']')
fn text(input: &str) -> IResult<&str, &str> {
    is_not("[]").parse(input)
}

/// Parser for spacing (one or more spaces)
fn spacing(input: &str) -> IResult<&str, &str> {
    recognize(many1(char(' '))).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_mixed() {
        let input = "[%eval 123] some text [%clk 12:34:56]";
        let (_, parsed) = parse_comments(input).unwrap();
        assert_eq!(
            parsed,
            vec![
                CommentContent::Tag(ParsedTag::Eval(123.0)),
                CommentContent::Text(" some text ".to_string()),
                CommentContent::Tag(ParsedTag::Clk {
                    hours: 12,
                    minutes: 34,
                    seconds: 56
                }),
            ]
        );
    }

    #[test]
    fn test_eval_tag_negative_decimal() {
        let (_, parsed) = tag_parser("[%eval -0.45]").unwrap();
        assert_eq!(parsed, ParsedTag::Eval(-0.45));
    }

    #[test]
    fn test_mate_tag() {
        let (_, parsed) = tag_parser("[%mate -3]").unwrap();
        assert_eq!(parsed, ParsedTag::Mate(-3));
    }

    #[test]
    fn test_clk_tag_rejects_plain_number() {
        assert!(tag_parser("[%clk 123]").is_err());
    }

    #[test]
    fn test_text_run() {
        let (_, parsed) = text("some text").unwrap();
        assert_eq!(parsed, "some text");
    }

    #[test]
    fn test_signed_number() {
        let (_, parsed) = signed_number("-123.45").unwrap();
        assert_eq!(parsed, "-123.45");
    }

    #[test]
    fn test_extract_score_prefers_first_tag() {
        assert_eq!(
            extract_score("[%eval 0.17] [%mate 5]"),
            Some(Score::Eval(0.17))
        );
        assert_eq!(extract_score("[%mate -2] nice"), Some(Score::Mate(-2)));
        assert_eq!(extract_score("just words"), None);
        assert_eq!(extract_score("[%clk 0:03:00]"), None);
    }
}
