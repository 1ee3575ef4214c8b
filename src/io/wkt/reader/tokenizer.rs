use crate::error::{GeoStreamError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Token<'a> {
    Word(&'a str),
    Number(f64),
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Equals,
    Eof,
}

impl Token<'_> {
    pub(super) fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{w}'"),
            Token::Number(n) => format!("number {n}"),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Splits WKT text into tokens with single-token lookahead.
///
/// The words `nan`, `inf` and `infinity` (in any case, optionally signed) are numbers.
#[derive(Debug, Clone)]
pub(super) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<(usize, Token<'a>)>,
}

impl<'a> Tokenizer<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
        }
    }

    /// The byte offset of the next token.
    pub(super) fn position(&mut self) -> usize {
        match self.peeked {
            Some((pos, _)) => pos,
            None => {
                self.skip_whitespace();
                self.pos
            }
        }
    }

    pub(super) fn peek(&mut self) -> Result<Token<'a>> {
        if let Some((_, token)) = self.peeked {
            return Ok(token);
        }
        let start = self.position();
        let token = self.lex()?;
        self.peeked = Some((start, token));
        Ok(token)
    }

    pub(super) fn next_token(&mut self) -> Result<Token<'a>> {
        match self.peeked.take() {
            Some((_, token)) => Ok(token),
            None => self.lex(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn lex(&mut self) -> Result<Token<'a>> {
        self.skip_whitespace();
        let bytes = self.input.as_bytes();
        let Some(&c) = bytes.get(self.pos) else {
            return Ok(Token::Eof);
        };

        let single = match c {
            b'(' => Some(Token::LeftParen),
            b')' => Some(Token::RightParen),
            b',' => Some(Token::Comma),
            b';' => Some(Token::Semicolon),
            b'=' => Some(Token::Equals),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(token);
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            let word = self.take_while(|b| b.is_ascii_alphabetic() || b == b'_');
            return Ok(special_number(word, false).map_or(Token::Word(word), Token::Number));
        }

        if c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.') {
            let start = self.pos;
            let signed_word = matches!(c, b'+' | b'-')
                && bytes
                    .get(start + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic());
            if signed_word {
                self.pos += 1;
                let word = self.take_while(|b| b.is_ascii_alphabetic());
                return special_number(word, c == b'-')
                    .map(Token::Number)
                    .ok_or_else(|| {
                        GeoStreamError::malformed(start, format!("Invalid number '{c}{word}'", c = c as char))
                    });
            }

            let text = self.take_while(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
            return lexical_core::parse::<f64>(text.as_bytes())
                .map(Token::Number)
                .map_err(|_| GeoStreamError::malformed(start, format!("Invalid number '{text}'")));
        }

        let unexpected = self.input[self.pos..].chars().next().unwrap_or('?');
        Err(GeoStreamError::malformed(
            self.pos,
            format!("Unexpected character '{unexpected}'"),
        ))
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        let len = self.input.as_bytes()[start..]
            .iter()
            .take_while(|b| pred(**b))
            .count();
        self.pos += len;
        &self.input[start..self.pos]
    }
}

fn special_number(word: &str, negative: bool) -> Option<f64> {
    let value = if word.eq_ignore_ascii_case("nan") {
        f64::NAN
    } else if word.eq_ignore_ascii_case("inf") || word.eq_ignore_ascii_case("infinity") {
        f64::INFINITY
    } else {
        return None;
    };
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        let mut tokenizer = Tokenizer::new(input);
        let mut out = vec![];
        loop {
            let token = tokenizer.next_token().unwrap();
            if token == Token::Eof {
                return out;
            }
            out.push(token);
        }
    }

    #[test]
    fn point() {
        assert_eq!(
            tokens("  POINT(1.5 -2e3)\n"),
            vec![
                Token::Word("POINT"),
                Token::LeftParen,
                Token::Number(1.5),
                Token::Number(-2000.),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn srid_prefix() {
        assert_eq!(
            tokens("SRID=4326;POINT EMPTY"),
            vec![
                Token::Word("SRID"),
                Token::Equals,
                Token::Number(4326.),
                Token::Semicolon,
                Token::Word("POINT"),
                Token::Word("EMPTY"),
            ]
        );
    }

    #[test]
    fn special_numbers() {
        let t = tokens("inf -Infinity +inf");
        assert_eq!(
            t,
            vec![
                Token::Number(f64::INFINITY),
                Token::Number(f64::NEG_INFINITY),
                Token::Number(f64::INFINITY),
            ]
        );
        match tokens("NaN")[0] {
            Token::Number(n) => assert!(n.is_nan()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn peek_then_position() {
        let mut tokenizer = Tokenizer::new("POINT   (");
        assert_eq!(tokenizer.next_token().unwrap(), Token::Word("POINT"));
        assert_eq!(tokenizer.peek().unwrap(), Token::LeftParen);
        assert_eq!(tokenizer.position(), 8);
    }

    #[test]
    fn errors() {
        let mut tokenizer = Tokenizer::new("1.2.3");
        assert!(matches!(
            tokenizer.next_token(),
            Err(GeoStreamError::Malformed { position: 0, .. })
        ));

        let mut tokenizer = Tokenizer::new("POINT # 1");
        tokenizer.next_token().unwrap();
        assert!(matches!(
            tokenizer.next_token(),
            Err(GeoStreamError::Malformed { position: 6, .. })
        ));

        let mut tokenizer = Tokenizer::new("-banana");
        assert!(tokenizer.next_token().is_err());
    }
}
