//! Error rendering with miette.
//!
//! Front-end errors point at a byte offset in the source and are shown with
//! a labelled snippet; every other error is shown as a plain message with
//! an optional hint.

use infix_core::Error;
use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, Report};

/// An [`Error`] paired with the source text it was raised for.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
pub struct ExpressionError {
    message: String,
    #[source_code]
    source_code: NamedSource<String>,
    #[label(collection)]
    labels: Vec<LabeledSpan>,
    #[help]
    help: Option<String>,
}

impl ExpressionError {
    pub fn new(error: &Error, source: &str) -> Self {
        let (message, labels) = match error {
            Error::Syntax { offset, message } => {
                let offset = (*offset).min(source.len());
                let len = source[offset..].chars().next().map_or(0, char::len_utf8);
                (
                    "syntax error".to_string(),
                    vec![LabeledSpan::new(Some(message.clone()), offset, len)],
                )
            }
            Error::UnknownReference { name } => {
                let labels = find_identifier(source, name)
                    .map(|offset| LabeledSpan::new(Some("not defined".into()), offset, name.len()))
                    .into_iter()
                    .collect();
                (error.to_string(), labels)
            }
            other => (other.to_string(), Vec::new()),
        };

        Self {
            message,
            source_code: NamedSource::new("<expression>", source.to_string()),
            labels,
            help: help_for(error),
        }
    }
}

fn help_for(error: &Error) -> Option<String> {
    let help = match error {
        Error::UnknownReference { .. } => {
            "bind the name as a variable, or declare it as a local before compiling"
        }
        Error::TypeMismatch { .. } | Error::UnsupportedOperation { .. } => {
            "numbers promote int -> long -> float -> double; only + accepts strings"
        }
        Error::TooManyLocals | Error::TooManyConstants => {
            "instruction operands address at most 65536 entries"
        }
        _ => return None,
    };
    Some(help.to_string())
}

/// First occurrence of `name` as a whole identifier.
fn find_identifier(source: &str, name: &str) -> Option<usize> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    source.match_indices(name).map(|(i, _)| i).find(|&i| {
        let before = source[..i].chars().next_back();
        let after = source[i + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Render an error with formatting to stderr.
///
/// # Example
/// ```no_run
/// use infix::{Engine, NoVariables, render_error};
///
/// let source = "1 + true";
/// if let Err(e) = Engine::default().evaluate(source, &mut NoVariables) {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &Error, source: &str) {
    eprintln!("{:?}", Report::new(ExpressionError::new(error, source)));
}

/// Render an error to a String without color codes (useful for tests).
pub fn render_error_to_string_no_color(error: &Error, source: &str) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, &ExpressionError::new(error, source))
        .ok();
    out
}
