use thiserror::Error;

use crate::models::normalize_name;

/// A literal value inside an item-list field.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Set(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListParseError {
    #[error("empty input")]
    Empty,
    #[error("value is not a list")]
    NotAList,
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected {found:?} at offset {offset}")]
    Unexpected { offset: usize, found: char },
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("invalid number {text:?} at offset {offset}")]
    InvalidNumber { offset: usize, text: String },
}

/// Parse the literal representation of a list, e.g. `['mug', "tote bag"]`.
pub fn parse_item_list(text: &str) -> Result<Vec<Literal>, ListParseError> {
    let mut parser = Parser::new(text);
    parser.skip_ws();
    if parser.peek().is_none() {
        return Err(ListParseError::Empty);
    }

    let value = parser.value()?;
    parser.skip_ws();
    if let Some(found) = parser.peek() {
        return Err(ListParseError::Unexpected {
            offset: parser.pos,
            found,
        });
    }

    match value {
        Literal::List(items) => Ok(items),
        _ => Err(ListParseError::NotAList),
    }
}

/// Decode an item-list field into lowercase, trimmed item names.
/// Never fails: missing, malformed or non-list input yields an empty list,
/// and non-text elements are dropped.
pub fn decode_item_list(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    match parse_item_list(text) {
        Ok(items) => items
            .into_iter()
            .filter_map(|lit| match lit {
                Literal::Str(s) => Some(normalize_name(&s)),
                _ => None,
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Encode item names as a list literal: `['mug', 'tote bag']`.
pub fn encode_item_list<S: AsRef<str>>(names: &[S]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| quote(n.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    format!("'{escaped}'")
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Literal, ListParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(ListParseError::UnexpectedEnd),
            Some('[') => {
                self.bump();
                let (items, _) = self.delimited(']', Self::value)?;
                Ok(Literal::List(items))
            }
            Some('(') => self.tuple(),
            Some('{') => self.braced(),
            Some(q @ ('\'' | '"')) => self.string(q),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            Some(found) => Err(ListParseError::Unexpected {
                offset: self.pos,
                found,
            }),
        }
    }

    /// Elements up to and including `close`, after the opening bracket.
    /// Also reports whether any separating comma was seen.
    fn delimited<T>(
        &mut self,
        close: char,
        mut element: impl FnMut(&mut Self) -> Result<T, ListParseError>,
    ) -> Result<(Vec<T>, bool), ListParseError> {
        let mut items = Vec::new();
        let mut comma = false;
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(ListParseError::UnexpectedEnd),
                Some(c) if c == close => {
                    self.bump();
                    return Ok((items, comma));
                }
                _ => {}
            }

            items.push(element(self)?);

            self.skip_ws();
            let offset = self.pos;
            match self.bump() {
                Some(',') => comma = true,
                Some(c) if c == close => return Ok((items, comma)),
                Some(found) => return Err(ListParseError::Unexpected { offset, found }),
                None => return Err(ListParseError::UnexpectedEnd),
            }
        }
    }

    /// `(x)` is just `x`; `()` and `(x,)` are tuples.
    fn tuple(&mut self) -> Result<Literal, ListParseError> {
        self.bump();
        let (mut items, comma) = self.delimited(')', Self::value)?;
        if items.len() == 1 && !comma {
            return Ok(items.remove(0));
        }
        Ok(Literal::Tuple(items))
    }

    /// `{}` and `{k: v, ..}` are dicts, `{a, ..}` is a set.
    fn braced(&mut self) -> Result<Literal, ListParseError> {
        self.bump();
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Literal::Dict(Vec::new()));
        }

        let start = self.pos;
        self.value()?;
        self.skip_ws();
        let is_dict = self.peek() == Some(':');
        self.pos = start;

        if is_dict {
            let (entries, _) = self.delimited('}', Self::dict_entry)?;
            Ok(Literal::Dict(entries))
        } else {
            let (items, _) = self.delimited('}', Self::value)?;
            Ok(Literal::Set(items))
        }
    }

    fn dict_entry(&mut self) -> Result<(Literal, Literal), ListParseError> {
        let key = self.value()?;
        self.skip_ws();
        let offset = self.pos;
        match self.bump() {
            Some(':') => {}
            Some(found) => return Err(ListParseError::Unexpected { offset, found }),
            None => return Err(ListParseError::UnexpectedEnd),
        }
        let value = self.value()?;
        Ok((key, value))
    }

    fn string(&mut self, quote: char) -> Result<Literal, ListParseError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(ListParseError::UnterminatedString { offset: start }),
                Some(c) if c == quote => return Ok(Literal::Str(out)),
                Some('\\') => match self.bump() {
                    None => return Err(ListParseError::UnterminatedString { offset: start }),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('\n') => {}
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    // Unknown escapes are kept verbatim.
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Literal, ListParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | '_'))
        {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        let cleaned = text.replace('_', "");
        if let Ok(i) = cleaned.parse::<i64>() {
            return Ok(Literal::Int(i));
        }
        match cleaned.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Literal::Float(f)),
            _ => Err(ListParseError::InvalidNumber {
                offset: start,
                text: text.to_string(),
            }),
        }
    }

    fn keyword(&mut self) -> Result<Literal, ListParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            word => Err(ListParseError::Unexpected {
                offset: start,
                found: word.chars().next().unwrap_or('?'),
            }),
        }
    }
}

#[cfg(test)]
#[path = "list_codec_tests.rs"]
mod tests;
