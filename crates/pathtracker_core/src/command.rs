//! Tokenizer for the command language.
//!
//! A line is split on double quotes first. Text outside quotes is split on
//! whitespace; text inside quotes is kept verbatim as a single token. The
//! first token names the command, tokens up to the first `-`-prefixed token
//! are positional arguments, and every `-`-prefixed token after that opens a
//! flag that owns the tokens following it.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Mismatched quotation marks. Cannot process input.")]
    MismatchedQuotes,
    #[error("Command cannot begin with a quoted value.")]
    LeadingQuotedValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub id: String,
    pub args: Vec<String>,
}

impl Flag {
    /// The single argument of this flag, if it was given exactly one.
    pub fn single_arg(&self) -> Option<&str> {
        match self.args.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    pub name: String,
    pub args: Vec<String>,
    pub flags: Vec<Flag>,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<RawCommand>, ParseError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let tokens = tokenize(line)?;
    let mut tokens = tokens.into_iter().peekable();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };

    let mut args = Vec::new();
    while let Some(token) = tokens.next_if(|t| !is_flag_token(t)) {
        args.push(token);
    }

    let mut flags = Vec::new();
    while let Some(token) = tokens.next() {
        let mut flag = Flag {
            id: token[1..].to_string(),
            args: Vec::new(),
        };
        while let Some(arg) = tokens.next_if(|t| !is_flag_token(t)) {
            flag.args.push(arg);
        }
        flags.push(flag);
    }

    Ok(Some(RawCommand { name, args, flags }))
}

fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    if line.matches('"').count() % 2 == 1 {
        return Err(ParseError::MismatchedQuotes);
    }

    let mut segments = line.split('"');
    let head = segments.next().unwrap_or_default();
    if head.is_empty() {
        return Err(ParseError::LeadingQuotedValue);
    }

    let mut tokens: Vec<String> = head.split_whitespace().map(str::to_string).collect();
    for (index, segment) in segments.enumerate() {
        // Segments alternate: quoted, unquoted, quoted, ...
        if index % 2 == 0 {
            tokens.push(segment.to_string());
        } else {
            tokens.extend(segment.split_whitespace().map(str::to_string));
        }
    }
    Ok(tokens)
}

fn is_flag_token(token: &str) -> bool {
    token.starts_with('-')
}
