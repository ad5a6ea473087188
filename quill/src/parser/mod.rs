use crate::ast::{Expression, Program, TypeAnnotation};
use pest::iterators::{Pair, Pairs};
use pest::Parser;

// Declare submodules
pub mod errors;
pub mod expressions;
pub mod statements;
pub mod types;

pub use errors::ParseError;
use expressions::build_expression;
use statements::build_statement;
use types::build_type_expr;

// Define the parser struct using the grammar file
#[derive(pest_derive::Parser)]
#[grammar = "quill.pest"] // Path relative to src/
pub struct QuillParser;

// Unwraps the single top rule and hands back its children, minus EOI
fn top_level<'i>(
    mut pairs: Pairs<'i, Rule>,
    what: &str,
) -> Result<Vec<Pair<'i, Rule>>, ParseError> {
    let top = pairs
        .next()
        .ok_or_else(|| ParseError::MissingToken(what.to_string()))?;
    Ok(top
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .collect())
}

// --- Main Parsing Functions ---

/// Parse a whole Quill source file.
pub fn parse(input: &str) -> Result<Program, ParseError> {
    let pairs = QuillParser::parse(Rule::program, input)?;
    let statements = top_level(pairs, "program")?
        .into_iter()
        .map(build_statement)
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("parsed {} top-level statements", statements.len());
    Ok(Program::new(statements))
}

/// Parse a single expression (useful for tests and tooling)
pub fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    let pairs = QuillParser::parse(Rule::expression_only, input)?;
    let expr = top_level(pairs, "expression")?
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::MissingToken("expression".to_string()))?;
    build_expression(expr)
}

/// Parse a type annotation such as `list<int>` or `fn(int) -> str`
pub fn parse_type_annotation(input: &str) -> Result<TypeAnnotation, ParseError> {
    let pairs = QuillParser::parse(Rule::type_only, input)?;
    let ty = top_level(pairs, "type")?
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::MissingToken("type".to_string()))?;
    build_type_expr(ty)
}

/// Next child of a pair, or a `MissingToken` error naming what was expected.
pub(crate) fn next_pair<'a>(
    inner: &mut Pairs<'a, Rule>,
    what: &str,
) -> Result<Pair<'a, Rule>, ParseError> {
    inner
        .next()
        .ok_or_else(|| ParseError::MissingToken(what.to_string()))
}
