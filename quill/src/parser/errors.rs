use super::Rule;
use crate::error_reporting::{location_suffix, SourceLocation};
use pest::error::LineColLocation;
use pest::iterators::Pair;
use thiserror::Error;

// Helper function to create a SourceLocation from a Pair
pub fn pair_location(pair: &Pair<Rule>) -> SourceLocation {
    let (line, column) = pair.as_span().start_pos().line_col();
    SourceLocation::new(line, column)
}

pub fn invalid_literal_error(message: &str, pair: &Pair<Rule>) -> ParseError {
    ParseError::InvalidLiteral {
        message: message.to_string(),
        text: pair.as_str().to_string(),
        location: Some(pair_location(pair)),
    }
}

pub fn unexpected_rule_error(expected: &str, pair: &Pair<Rule>) -> ParseError {
    ParseError::UnexpectedRule {
        expected: expected.to_string(),
        found: format!("{:?}", pair.as_rule()),
        location: Some(pair_location(pair)),
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(Box<pest::error::Error<Rule>>),

    #[error("Invalid literal '{text}': {message}{}", location_suffix(.location))]
    InvalidLiteral {
        message: String,
        text: String,
        location: Option<SourceLocation>,
    },

    #[error("Duplicate parameter '{name}' in function {function}{}", location_suffix(.location))]
    DuplicateParameter {
        function: String,
        name: String,
        location: Option<SourceLocation>,
    },

    #[error(
        "Parameter '{name}' of function {function} has no default but follows one that does{}",
        location_suffix(.location)
    )]
    InvalidParameterOrder {
        function: String,
        name: String,
        location: Option<SourceLocation>,
    },

    #[error("Expected {expected}, found {found}{}", location_suffix(.location))]
    UnexpectedRule {
        expected: String,
        found: String,
        location: Option<SourceLocation>,
    },

    #[error("Missing {0}")]
    MissingToken(String),
}

impl ParseError {
    /// Where the failure starts, when known.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            ParseError::Syntax(err) => {
                let (line, column) = match err.line_col {
                    LineColLocation::Pos(pos) => pos,
                    LineColLocation::Span(start, _) => start,
                };
                Some(SourceLocation::new(line, column))
            }
            ParseError::InvalidLiteral { location, .. }
            | ParseError::DuplicateParameter { location, .. }
            | ParseError::InvalidParameterOrder { location, .. }
            | ParseError::UnexpectedRule { location, .. } => *location,
            ParseError::MissingToken(_) => None,
        }
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ParseError::Syntax(Box::new(err))
    }
}
