use tracing::trace;

use crate::ast::{Attribute, Body, Tag};
use crate::config::Delimiters;
use crate::error::{LexError, ParseError, Result};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Groups the token stream into tags. Any lexer error aborts the parse.
pub struct MarkupParser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> MarkupParser<'a> {
    pub fn new(input: &'a str, delimiters: &Delimiters) -> Self {
        Self {
            lexer: Lexer::new(input, delimiters),
        }
    }

    /// Parse template markup into its tags, in source order.
    pub fn parse_input(input: &'a str, delimiters: &Delimiters) -> Result<Vec<Tag>> {
        MarkupParser::new(input, delimiters).parse_tags()
    }

    pub fn parse_tags(&mut self) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::EndOfInput => break,
                TokenKind::Identifier => tags.push(self.parse_tag(token)?),
                _ => return Err(unexpected(&token, "tag name")),
            }
        }
        trace!(count = tags.len(), "parsed tags");
        Ok(tags)
    }

    /// Next token, with lexer errors turned into parse errors. The lexer
    /// repeats its terminal token, so end of input may be read twice.
    fn next(&mut self) -> Result<Token<'a>> {
        let token = self.lexer.next_token();
        match token.kind {
            TokenKind::Error(kind) => Err(LexError {
                kind,
                pos: token.pos,
            }
            .into()),
            _ => Ok(token),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token<'a>> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(&token, expected))
        }
    }

    fn parse_tag(&mut self, name: Token<'a>) -> Result<Tag> {
        let mut tag = Tag {
            name: name.text.into_owned(),
            attributes: Vec::new(),
            body: None,
            line: name.pos.line,
        };
        let mut spaced = false;

        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Newline | TokenKind::EndOfInput => return Ok(tag),
                TokenKind::Space if tag.body.is_none() => spaced = true,
                TokenKind::AttributePrefix if spaced && tag.body.is_none() => {
                    tag.attributes.push(self.parse_attribute()?);
                    spaced = false;
                }
                TokenKind::BodyOpen if tag.body.is_none() => {
                    tag.body = Some(self.parse_body()?);
                }
                _ if tag.body.is_some() => return Err(unexpected(&token, "newline")),
                _ => return Err(unexpected(&token, "space, attribute, body or newline")),
            }
        }
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let name = self.expect(TokenKind::Identifier, "attribute name")?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.expect(TokenKind::StringLiteral, "quoted string")?;

        Ok(Attribute {
            name: name.text.into_owned(),
            value: unquote(&value.text).to_owned(),
        })
    }

    fn parse_body(&mut self) -> Result<Body> {
        let mut body = Body {
            content: String::new(),
            inline: true,
        };
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Newline => body.inline = false,
                TokenKind::BodyText => body.content = token.text.into_owned(),
                TokenKind::BodyClose => return Ok(body),
                _ => return Err(unexpected(&token, "closing delimiter")),
            }
        }
    }
}

fn unexpected(token: &Token, expected: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.kind.clone(),
        expected,
        pos: token.pos,
    }
}

/// Strip the surrounding quotes of a string literal.
fn unquote(literal: &str) -> &str {
    let mut chars = literal.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexErrorKind;

    fn parse(input: &str) -> Result<Vec<Tag>> {
        MarkupParser::parse_input(input, &Delimiters::default())
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_bare_tag() {
        let tags = parse("filename").unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "filename");
        assert!(tags[0].attributes.is_empty());
        assert!(tags[0].body.is_none());
    }

    #[test]
    fn test_parse_attributes_keep_order_and_duplicates() {
        let tags = parse(r#"partial -name="a" -x='1' -name="b""#).unwrap();
        let attrs: Vec<_> = tags[0]
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(attrs, vec![("name", "a"), ("x", "1"), ("name", "b")]);
        assert_eq!(tags[0].attribute("name"), Some("b"));
        assert_eq!(tags[0].attribute("missing"), None);
    }

    #[test]
    fn test_parse_inline_body() {
        let tags = parse("filename << name + '.rs' >>").unwrap();
        assert_eq!(
            tags[0].body,
            Some(Body {
                content: " name + '.rs' ".to_string(),
                inline: true,
            })
        );
    }

    #[test]
    fn test_parse_empty_inline_body() {
        let tags = parse("template <<>>").unwrap();
        assert_eq!(
            tags[0].body,
            Some(Body {
                content: String::new(),
                inline: true,
            })
        );
    }

    #[test]
    fn test_parse_multiline_body() {
        let input = "template <<\nfn main() {\n    println!(\"<<hi>>\");\n}\n>>\n";
        let tags = parse(input).unwrap();
        assert_eq!(
            tags[0].body,
            Some(Body {
                content: "fn main() {\n    println!(\"<<hi>>\");\n}".to_string(),
                inline: false,
            })
        );
    }

    #[test]
    fn test_parse_empty_multiline_body() {
        let tags = parse("template <<\n>>").unwrap();
        let body = tags[0].body.as_ref().unwrap();
        assert_eq!(body.content, "");
        assert!(!body.inline);
    }

    #[test]
    fn test_parse_multiple_tags_with_lines() {
        let input = "# header\nvariable -name=\"x\" << 1 >>\n\ntemplate <<\nbody\n>>\nskipif";
        let tags = parse(input).unwrap();
        let summary: Vec<_> = tags.iter().map(|t| (t.name.as_str(), t.line)).collect();
        assert_eq!(
            summary,
            vec![("variable", 2), ("template", 4), ("skipif", 7)]
        );
    }

    #[test]
    fn test_parse_propagates_lexer_error() {
        let err = parse("template << ok >>\n t").unwrap_err();
        match err {
            ParseError::Lex(LexError { kind, pos }) => {
                assert_eq!(kind, LexErrorKind::MisplacedTagStart('t'));
                assert_eq!(pos.line, 2);
                assert_eq!(pos.offset, 19);
            }
            other => panic!("Expected lexer error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_attribute_requires_separating_space() {
        let err = parse(r#"tag -a="1"-b="2""#).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                found: TokenKind::AttributePrefix,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_attribute_after_body_rejected() {
        assert!(parse(r#"tag <<x>> -a="1""#).is_err());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""value""#), "value");
        assert_eq!(unquote("''"), "");
    }
}
