// Splits a `<key> <value...>` command line into its two fields.
use crate::core::buffer::LineBuffer;
use crate::core::error::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    pub key: String,
    pub value: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Key,
    Value,
}

/// Scans `line` once, left to right. Everything before the first space is
/// the key; everything after it (further spaces included) is the value. A
/// line without a space is all key with an empty value. A NUL ends the line.
pub fn parse_assignment(line: &str, chunk: usize) -> Result<Assignment, Error> {
    let mut key = LineBuffer::with_chunk(chunk)?;
    let mut value = LineBuffer::with_chunk(chunk)?;
    let mut phase = Phase::Key;

    for ch in line.chars() {
        if ch == '\0' {
            break;
        }
        match phase {
            Phase::Key if ch == ' ' => phase = Phase::Value,
            Phase::Key => key.push(ch)?,
            Phase::Value => value.push(ch)?,
        }
    }

    Ok(Assignment {
        key: key.into_string(),
        value: value.into_string(),
    })
}
