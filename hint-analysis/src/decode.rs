//! Instruction text decoder.
//!
//! Decodes the ttx assembly form of a hinting program:
//!
//! ```text
//! PUSHB[ ]  /* 2 values pushed */
//! 10 3
//! CALL[ ]
//! MDRP[01101]
//! ```

use crate::{
    error::{DecodeError, DecodeErrorKind},
    instruction::{Data, Statement},
    Mnemonic,
};

/// A single classified token.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    Data(Data),
    Instruction(Mnemonic, Option<Data>),
}

/// Classifies one raw token.
///
/// Pure integer tokens become data. Otherwise the text before `[` names the
/// mnemonic and any digits inside the brackets become the first operand.
pub fn decode_token(token: &str) -> Result<Token, DecodeErrorKind> {
    if let Some(data) = decode_data(token) {
        return Ok(Token::Data(data));
    }
    let (name, operand) = match token.split_once('[') {
        Some((name, rest)) => {
            let bracketed = rest.split(']').next().unwrap_or_default();
            let digits: String = bracketed.chars().filter(char::is_ascii_digit).collect();
            (name, (!digits.is_empty()).then_some(Data::Text(digits)))
        }
        None => (token, None),
    };
    let mnemonic = Mnemonic::from_name(name.trim())
        .ok_or_else(|| DecodeErrorKind::UnknownMnemonic(name.trim().into()))?;
    Ok(Token::Instruction(mnemonic, operand))
}

fn decode_data(token: &str) -> Option<Data> {
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Values wider than 32 bits cannot come from a push, keep their text.
    Some(match token.parse() {
        Ok(value) => Data::Int(value),
        Err(_) => Data::Text(token.into()),
    })
}

/// Returns an iterator over the raw tokens of a program.
///
/// A `/*` comment truncates the rest of its line and a bracket group like
/// `PUSHB[ ]` stays within one token.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.lines().flat_map(line_tokens)
}

fn line_tokens(line: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = match line.find("/*") {
        Some(end) => &line[..end],
        None => line,
    };
    core::iter::from_fn(move || {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let mut depth = 0usize;
        let end = rest
            .char_indices()
            .find(|&(_, ch)| match ch {
                '[' => {
                    depth += 1;
                    false
                }
                ']' => {
                    depth = depth.saturating_sub(1);
                    false
                }
                _ => depth == 0 && ch.is_whitespace(),
            })
            .map(|(ix, _)| ix)
            .unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}

/// Decodes statements from instruction text.
///
/// Data tokens are attached to the most recent instruction, so a statement
/// is only yielded once the next instruction (or the end of the text) is
/// reached.
pub struct Decoder<'a, I> {
    tag: &'a str,
    tokens: I,
    position: usize,
    pending: Option<Statement>,
    next_index: usize,
}

impl<'a, I> Decoder<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    /// Creates a new decoder over already split tokens.
    pub fn from_tokens(tag: &'a str, tokens: I) -> Self {
        Self {
            tag,
            tokens,
            position: 0,
            pending: None,
            next_index: 0,
        }
    }

    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError {
            tag: self.tag.into(),
            token: self.position,
            kind,
        }
    }
}

impl<'a, I> Iterator for Decoder<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = Result<Statement, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(token) = self.tokens.next() {
            let decoded = decode_token(token).map_err(|kind| self.error(kind));
            self.position += 1;
            match decoded {
                Ok(Token::Data(data)) => match self.pending.as_mut() {
                    Some(statement) => statement.data.push(data),
                    None => {
                        self.position -= 1;
                        let err = self.error(DecodeErrorKind::LeadingData(token.into()));
                        // Stop after the first error.
                        while self.tokens.next().is_some() {}
                        return Some(Err(err));
                    }
                },
                Ok(Token::Instruction(mnemonic, operand)) => {
                    let mut statement = Statement::new(mnemonic, self.next_index);
                    statement.data.extend(operand);
                    self.next_index += 1;
                    if let Some(finished) = self.pending.replace(statement) {
                        return Some(Ok(finished));
                    }
                }
                Err(err) => {
                    while self.tokens.next().is_some() {}
                    self.pending = None;
                    return Some(Err(err));
                }
            }
        }
        self.pending.take().map(Ok)
    }
}

/// Returns an iterator that yields all statements of the program text with
/// the given tag.
pub fn decode_all<'a>(
    tag: &'a str,
    text: &'a str,
) -> Decoder<'a, impl Iterator<Item = &'a str> + 'a> {
    Decoder::from_tokens(tag, tokens(text))
}

/// Decodes all statements of a program.
pub fn decode_program(tag: &str, text: &str) -> Result<Vec<Statement>, DecodeError> {
    decode_all(tag, text).collect()
}
