use super::errors::{pair_location, unexpected_rule_error};
use super::expressions::build_expression;
use super::types::build_type_expr;
use super::{next_pair, ParseError, Rule};
use crate::ast::{FunctionDef, ParamList, ParamShape, Parameter, Statement};
use pest::iterators::Pair;
use std::collections::HashSet;

pub fn build_statement(pair: Pair<Rule>) -> Result<Statement, ParseError> {
    match pair.as_rule() {
        Rule::let_stmt => {
            let mut name = None;
            let mut annotation = None;
            let mut value = None;
            for child in pair.into_inner() {
                match child.as_rule() {
                    Rule::identifier => name = Some(child.as_str().to_string()),
                    Rule::type_expr => annotation = Some(build_type_expr(child)?),
                    _ => value = Some(build_expression(child)?),
                }
            }
            Ok(Statement::Let {
                name: name.ok_or_else(|| ParseError::MissingToken("let name".to_string()))?,
                annotation,
                value: value.ok_or_else(|| ParseError::MissingToken("let value".to_string()))?,
            })
        }
        Rule::assign_stmt => {
            let location = Some(pair_location(&pair));
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner, "assignment target")?.as_str().to_string();
            let value = build_expression(next_pair(&mut inner, "assigned value")?)?;
            Ok(Statement::Assign {
                name,
                value,
                location,
            })
        }
        Rule::func_def => Ok(Statement::FunctionDef(build_function_def(pair)?)),
        Rule::type_def => {
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner, "type name")?.as_str().to_string();
            let annotation = build_type_expr(next_pair(&mut inner, "type")?)?;
            Ok(Statement::TypeAlias { name, annotation })
        }
        Rule::return_stmt => {
            let location = Some(pair_location(&pair));
            let value = pair.into_inner().next().map(build_expression).transpose()?;
            Ok(Statement::Return { value, location })
        }
        Rule::if_stmt => build_if(pair),
        Rule::while_stmt => {
            let mut inner = pair.into_inner();
            let condition = build_expression(next_pair(&mut inner, "loop condition")?)?;
            let body = build_block(next_pair(&mut inner, "loop body")?)?;
            Ok(Statement::While { condition, body })
        }
        Rule::break_stmt => Ok(Statement::Break),
        Rule::continue_stmt => Ok(Statement::Continue),
        Rule::expr_stmt => {
            let mut inner = pair.into_inner();
            Ok(Statement::Expression(build_expression(next_pair(
                &mut inner,
                "expression",
            )?)?))
        }
        _ => Err(unexpected_rule_error("statement", &pair)),
    }
}

pub fn build_block(pair: Pair<Rule>) -> Result<Vec<Statement>, ParseError> {
    if pair.as_rule() != Rule::block {
        return Err(unexpected_rule_error("block", &pair));
    }
    pair.into_inner().map(build_statement).collect()
}

fn build_if(pair: Pair<Rule>) -> Result<Statement, ParseError> {
    let mut inner = pair.into_inner();
    let condition = build_expression(next_pair(&mut inner, "if condition")?)?;
    let then_branch = build_block(next_pair(&mut inner, "if body")?)?;
    let else_branch = match inner.next() {
        None => None,
        // `else if` becomes an else block holding the nested `if`
        Some(nested) if nested.as_rule() == Rule::if_stmt => Some(vec![build_if(nested)?]),
        Some(block) => Some(build_block(block)?),
    };
    Ok(Statement::If {
        condition,
        then_branch,
        else_branch,
    })
}

fn build_function_def(pair: Pair<Rule>) -> Result<FunctionDef, ParseError> {
    let location = Some(pair_location(&pair));
    let mut inner = pair.into_inner();
    let name = next_pair(&mut inner, "function name")?.as_str().to_string();

    let mut shape = ParamShape::Absent;
    let mut return_type = None;
    let mut body = None;
    for child in inner {
        match child.as_rule() {
            Rule::param_list => {
                let mut params = child
                    .into_inner()
                    .map(build_param)
                    .collect::<Result<Vec<_>, _>>()?;
                shape = if params.len() == 1 {
                    ParamShape::Single(params.remove(0))
                } else {
                    ParamShape::List(params)
                };
            }
            Rule::type_expr => return_type = Some(build_type_expr(child)?),
            Rule::block => body = Some(build_block(child)?),
            _ => return Err(unexpected_rule_error("function signature or body", &child)),
        }
    }

    let params = ParamList::normalize(shape);
    validate_params(&name, &params, location)?;

    Ok(FunctionDef {
        name,
        params,
        return_type,
        body: body.ok_or_else(|| ParseError::MissingToken("function body".to_string()))?,
        location,
    })
}

fn build_param(pair: Pair<Rule>) -> Result<Parameter, ParseError> {
    let mut inner = pair.into_inner();
    let mut param = Parameter::named(next_pair(&mut inner, "parameter name")?.as_str());
    for child in inner {
        match child.as_rule() {
            Rule::type_expr => param = param.with_annotation(build_type_expr(child)?),
            _ => param = param.with_default(build_expression(child)?),
        }
    }
    Ok(param)
}

// Names must be unique, and once a parameter has a default every later
// one needs one too.
fn validate_params(
    function: &str,
    params: &ParamList,
    location: Option<crate::error_reporting::SourceLocation>,
) -> Result<(), ParseError> {
    let mut seen = HashSet::new();
    let mut saw_default = false;
    for param in params {
        if !seen.insert(param.name.as_str()) {
            return Err(ParseError::DuplicateParameter {
                function: function.to_string(),
                name: param.name.clone(),
                location,
            });
        }
        if param.default.is_some() {
            saw_default = true;
        } else if saw_default {
            return Err(ParseError::InvalidParameterOrder {
                function: function.to_string(),
                name: param.name.clone(),
                location,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expression, Statement};
    use crate::parser::{parse, ParseError};

    #[test]
    fn test_keyword_prefixed_identifiers() {
        let program = parse("letter = 5\nreturned = letter\niffy(1)").unwrap();
        assert!(matches!(
            &program.statements[0],
            Statement::Assign { name, .. } if name == "letter"
        ));
        assert!(matches!(
            &program.statements[1],
            Statement::Assign { name, .. } if name == "returned"
        ));
        assert!(matches!(
            &program.statements[2],
            Statement::Expression(Expression::Call { callee, .. }) if callee == "iffy"
        ));
    }

    #[test]
    fn test_else_if_nests() {
        let program = parse("if a { 1 } else if b { 2 } else { 3 }").unwrap();
        match &program.statements[0] {
            Statement::If {
                else_branch: Some(else_branch),
                ..
            } => {
                assert_eq!(else_branch.len(), 1);
                assert!(matches!(
                    &else_branch[0],
                    Statement::If {
                        else_branch: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_parameter_validation() {
        assert!(matches!(
            parse("func f(a, a) { }"),
            Err(ParseError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            parse("func f(a = 1, b) { }"),
            Err(ParseError::InvalidParameterOrder { .. })
        ));
    }

    #[test]
    fn test_param_shapes() {
        let program = parse(
            "func none() {}\nfunc one(x) {}\nfunc two(x, y: int = 2) -> int { return x }",
        )
        .unwrap();
        let arities: Vec<usize> = program
            .statements
            .iter()
            .map(|s| match s {
                Statement::FunctionDef(def) => def.params.len(),
                other => panic!("unexpected statement: {:?}", other),
            })
            .collect();
        assert_eq!(arities, vec![0, 1, 2]);
    }
}
