//! One line of a symbol description, split into its positional fields and
//! the quoted payload that follows them.

use crate::{error::ParseError, COORD_LIMIT};

mod lexer;

use lexer::{TokenIter, TokenKind};

#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct Record<'a> {
    /// Keyword followed by the positional fields
    fields: Vec<&'a str>,
    /// Everything from the first quote on
    payload: Option<&'a str>,
}

impl<'a> Record<'a> {
    pub(crate) fn keyword(&self) -> &'a str {
        self.fields.first().copied().unwrap_or("")
    }

    /// Positional field `index`; the keyword is field 0.
    pub(crate) fn field(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied()
    }

    pub(crate) fn int(&self, index: usize) -> Result<i32, ParseError> {
        let value = self.field(index).unwrap_or("");
        value.parse().map_err(|_| ParseError::MalformedField {
            field: index,
            value: value.to_owned(),
        })
    }

    /// Integer field within `±COORD_LIMIT`.
    pub(crate) fn coord(&self, index: usize) -> Result<i32, ParseError> {
        let value = self.int(index)?;
        if value.unsigned_abs() > COORD_LIMIT.unsigned_abs() {
            return Err(ParseError::MalformedField {
                field: index,
                value: value.to_string(),
            });
        }
        Ok(value)
    }

    /// Text between the first and the last quote. The text may contain
    /// quotes itself.
    pub(crate) fn text(&self) -> Option<&'a str> {
        let inner = &self.payload?[1..];
        Some(inner.rfind('"').map_or(inner, |end| &inner[..end]))
    }

    /// The quoted groups following the fields, up to the first empty one.
    pub(crate) fn quoted_groups(&self) -> QuotedGroupIter<'a> {
        let mut iter = self.payload.unwrap_or("").split('"');
        // text before the first quote
        iter.next();
        QuotedGroupIter { iter }
    }
}

#[derive(Debug)]
pub(crate) struct QuotedGroupIter<'a> {
    iter: std::str::Split<'a, char>,
}

impl<'a> Iterator for QuotedGroupIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.iter.next().filter(|g| !g.is_empty())?;
        // separator up to the next opening quote
        self.iter.next();
        Some(group)
    }
}

impl<'a> From<&'a str> for Record<'a> {
    fn from(input: &'a str) -> Self {
        let mut fields = Vec::new();
        let mut payload = None;
        for token in TokenIter::new(input) {
            match token.kind {
                TokenKind::Word => fields.push(&input[token.span]),
                TokenKind::Quote => {
                    payload = Some(&input[token.span.start..]);
                    break;
                }
                TokenKind::Error => {
                    log::debug!("Skipping unreadable input at {:?}", token.span);
                }
            }
        }
        Record { fields, payload }
    }
}
