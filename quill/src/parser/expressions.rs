use super::errors::{invalid_literal_error, pair_location, unexpected_rule_error};
use super::{next_pair, ParseError, Rule};
use crate::ast::{BinaryOp, Expression, Literal, UnaryOp};
use pest::iterators::Pair;

pub fn build_expression(pair: Pair<Rule>) -> Result<Expression, ParseError> {
    match pair.as_rule() {
        Rule::expression => {
            let mut inner = pair.into_inner();
            build_expression(next_pair(&mut inner, "expression")?)
        }
        Rule::or_expr
        | Rule::and_expr
        | Rule::equality
        | Rule::comparison
        | Rule::additive
        | Rule::multiplicative => build_binary_chain(pair),
        Rule::unary => build_unary(pair),
        Rule::postfix => build_postfix(pair),
        Rule::integer | Rule::float | Rule::string | Rule::boolean => {
            Ok(Expression::Literal(build_literal(pair)?))
        }
        Rule::unit_lit => Ok(Expression::Literal(Literal::Unit)),
        Rule::variable => {
            let location = Some(pair_location(&pair));
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner, "identifier")?.as_str().to_string();
            Ok(Expression::Variable { name, location })
        }
        Rule::call_expr => {
            let location = Some(pair_location(&pair));
            let mut inner = pair.into_inner();
            let callee = next_pair(&mut inner, "callee")?.as_str().to_string();
            let args = inner.map(build_expression).collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::Call {
                callee,
                args,
                location,
            })
        }
        Rule::list_lit => Ok(Expression::List(build_all(pair)?)),
        Rule::tuple_lit => Ok(Expression::Tuple(build_all(pair)?)),
        Rule::record_lit => {
            let mut fields = Vec::new();
            for field in pair.into_inner() {
                let mut inner = field.into_inner();
                let name = next_pair(&mut inner, "field name")?.as_str().to_string();
                let value = build_expression(next_pair(&mut inner, "field value")?)?;
                fields.push((name, value));
            }
            Ok(Expression::Record(fields))
        }
        _ => Err(unexpected_rule_error("expression", &pair)),
    }
}

fn build_all(pair: Pair<Rule>) -> Result<Vec<Expression>, ParseError> {
    pair.into_inner().map(build_expression).collect()
}

// Left-associative fold of `operand (op operand)*`
fn build_binary_chain(pair: Pair<Rule>) -> Result<Expression, ParseError> {
    let mut inner = pair.into_inner();
    let mut left = build_expression(next_pair(&mut inner, "operand")?)?;
    while let Some(op_pair) = inner.next() {
        let op = binary_op(&op_pair)?;
        let right = build_expression(next_pair(&mut inner, "right operand")?)?;
        left = Expression::binary(op, left, right);
    }
    Ok(left)
}

fn binary_op(pair: &Pair<Rule>) -> Result<BinaryOp, ParseError> {
    Ok(match pair.as_rule() {
        Rule::op_or => BinaryOp::Or,
        Rule::op_and => BinaryOp::And,
        Rule::op_eq => BinaryOp::Eq,
        Rule::op_ne => BinaryOp::Ne,
        Rule::op_lt => BinaryOp::Lt,
        Rule::op_le => BinaryOp::Le,
        Rule::op_gt => BinaryOp::Gt,
        Rule::op_ge => BinaryOp::Ge,
        Rule::op_add => BinaryOp::Add,
        Rule::op_sub => BinaryOp::Sub,
        Rule::op_mul => BinaryOp::Mul,
        Rule::op_div => BinaryOp::Div,
        Rule::op_mod => BinaryOp::Mod,
        _ => return Err(unexpected_rule_error("binary operator", pair)),
    })
}

fn build_unary(pair: Pair<Rule>) -> Result<Expression, ParseError> {
    let mut ops = Vec::new();
    let mut operand = None;
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::op_neg => ops.push(UnaryOp::Neg),
            Rule::op_not => ops.push(UnaryOp::Not),
            _ => operand = Some(build_expression(child)?),
        }
    }
    let mut expr = operand.ok_or_else(|| ParseError::MissingToken("operand".to_string()))?;
    // The operator nearest the operand applies first.
    for op in ops.into_iter().rev() {
        expr = Expression::Unary {
            op,
            operand: Box::new(expr),
        };
    }
    Ok(expr)
}

fn build_postfix(pair: Pair<Rule>) -> Result<Expression, ParseError> {
    let mut inner = pair.into_inner();
    let mut expr = build_expression(next_pair(&mut inner, "primary")?)?;
    for access in inner {
        let location = Some(pair_location(&access));
        expr = match access.as_rule() {
            Rule::field_access => {
                let mut parts = access.into_inner();
                let field = next_pair(&mut parts, "field name")?.as_str().to_string();
                Expression::Field {
                    target: Box::new(expr),
                    field,
                    location,
                }
            }
            Rule::index_access => {
                let mut parts = access.into_inner();
                let index = build_expression(next_pair(&mut parts, "index")?)?;
                Expression::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                    location,
                }
            }
            _ => return Err(unexpected_rule_error("field or index access", &access)),
        };
    }
    Ok(expr)
}

pub fn build_literal(pair: Pair<Rule>) -> Result<Literal, ParseError> {
    match pair.as_rule() {
        Rule::integer => pair
            .as_str()
            .parse::<i64>()
            .map(Literal::Integer)
            .map_err(|e| invalid_literal_error(&e.to_string(), &pair)),
        Rule::float => pair
            .as_str()
            .parse::<f64>()
            .map(Literal::Float)
            .map_err(|e| invalid_literal_error(&e.to_string(), &pair)),
        Rule::boolean => Ok(Literal::Boolean(pair.as_str() == "true")),
        Rule::string => {
            let raw = pair
                .clone()
                .into_inner()
                .next()
                .map(|inner| inner.as_str())
                .unwrap_or("");
            unescape(raw)
                .map(Literal::String)
                .map_err(|message| invalid_literal_error(&message, &pair))
        }
        _ => Err(unexpected_rule_error("literal", &pair)),
    }
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => return Err(format!("unknown escape sequence '\\{}'", other)),
            None => return Err("trailing backslash".to_string()),
        }
    }
    Ok(out)
}
