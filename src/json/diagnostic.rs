//! Pluggable formatting for JSON parse errors (§4.3 [ADDED]).
//!
//! The lexer and parser only ever produce line/column-bearing [`Error`]
//! values; turning one into a message a human should read is deliberately
//! factored out from the core engineering, per §1's "opaque error-sink is
//! out of scope" stance. Any `fmt::Display` type is automatically a
//! `JsonDiagnostic`, so callers can install their own formatter just by
//! boxing it; [`CaretDiagnostic`] is the default.

use std::fmt;

use crate::error::Error;

pub trait JsonDiagnostic: fmt::Display {}

impl<T: fmt::Display> JsonDiagnostic for T {}

/// The error message, followed by the offending source line and a caret
/// under the reported column.
pub struct CaretDiagnostic<'a> {
    pub source: &'a str,
    pub error: Error,
}

impl fmt::Display for CaretDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;
        if let Some((line, column)) = error_position(&self.error) {
            if let Some(text) = self.source.lines().nth(line.saturating_sub(1)) {
                writeln!(f, "{text}")?;
                write!(f, "{}^", " ".repeat(column.saturating_sub(1)))?;
            }
        }
        Ok(())
    }
}

fn error_position(error: &Error) -> Option<(usize, usize)> {
    match *error {
        Error::UnexpectedChar { line, column, .. }
        | Error::CharacterSequence { line, column, .. }
        | Error::HexValue { line, column }
        | Error::Utf16 { line, column }
        | Error::StringBreakline { line, column }
        | Error::StringInfinity { line, column }
        | Error::StringCodepoint { line, column }
        | Error::ConvertNumber { line, column, .. } => Some((line, column)),
        _ => None,
    }
}

/// Build the default boxed diagnostic for `error` against `source`.
pub fn diagnostic(source: &str, error: Error) -> Box<dyn JsonDiagnostic + '_> {
    Box::new(CaretDiagnostic { source, error })
}
