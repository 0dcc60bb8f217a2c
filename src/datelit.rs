//! Rewrites the `new Date(y, m, d)` expressions the Abak API embeds in its
//! JSON responses into quoted ISO date-times, so the body can be parsed as
//! plain JSON.
//!
//! The month argument is zero-based, as in JavaScript. Year and day are
//! copied verbatim, so a day of `5` comes out as `-5T00:00:00`, unpadded.
//!
//! A literal is only recognised when a `),` follows it. A literal closing an
//! object (`new Date(2023,0,1)}`) is left alone, or worse, swallowed into the
//! span reaching the next `),`. Every byte-identical copy of a matched
//! literal is replaced at once.

use thiserror::Error;

const LITERAL: &str = "new Date";
const TERMINATOR: &str = "),";

#[derive(Debug, Error, PartialEq)]
pub enum DateLiteralError {
    #[error("Date literal `{0}` does not have year, month and day arguments")]
    MissingArguments(String),
    #[error("Date literal `{0}` has a non-numeric month")]
    InvalidMonth(String),
}

fn find_from(text: &str, needle: &str, from: usize) -> Option<usize> {
    let mut from = from.min(text.len());
    while !text.is_char_boundary(from) {
        from += 1;
    }
    text[from..].find(needle).map(|idx| from + idx)
}

fn iso_replacement(literal: &str) -> Result<String, DateLiteralError> {
    let open = literal.find('(').map(|idx| idx + 1).unwrap_or(0);
    let close = literal.find(')').unwrap_or(literal.len());
    let args: Vec<&str> = literal
        .get(open..close)
        .unwrap_or_default()
        .split(',')
        .collect();

    let [year, month, day, ..] = args.as_slice() else {
        return Err(DateLiteralError::MissingArguments(literal.to_string()));
    };

    let month: i64 = month
        .trim()
        .parse()
        .map_err(|_| DateLiteralError::InvalidMonth(literal.to_string()))?;

    let month = month
        .checked_add(1)
        .ok_or_else(|| DateLiteralError::InvalidMonth(literal.to_string()))?;

    Ok(format!("\"{year}-{month:02}-{day}T00:00:00\""))
}

/// Replaces every recognised date literal in `text`.
///
/// Text without any `new Date` is returned unchanged.
pub fn decode(text: &str) -> Result<String, DateLiteralError> {
    let mut text = text.to_string();

    let Some(mut start) = text.find(LITERAL) else {
        return Ok(text);
    };

    while let Some(end) = find_from(&text, TERMINATOR, start) {
        // span covers the closing parenthesis, not the comma
        let finish = end + 1;
        let literal = text[start..finish].to_string();
        let replacement = iso_replacement(&literal)?;
        text = text.replace(&literal, &replacement);

        // resume at the old end offset, even though the text has shifted
        match find_from(&text, LITERAL, finish) {
            Some(next) => start = next,
            None => break,
        }
    }

    Ok(text)
}
