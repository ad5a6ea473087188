use super::errors::unexpected_rule_error;
use super::{next_pair, ParseError, Rule};
use crate::ast::TypeAnnotation;
use pest::iterators::Pair;

// Build type annotation from a parsed pair
pub fn build_type_expr(pair: Pair<Rule>) -> Result<TypeAnnotation, ParseError> {
    match pair.as_rule() {
        // Wrapper rule; a parenthesized type nests another wrapper inside.
        Rule::type_expr => {
            let mut inner = pair.into_inner();
            build_type_expr(next_pair(&mut inner, "type")?)
        }
        Rule::type_name => Ok(TypeAnnotation::Named(pair.as_str().to_string())),
        Rule::type_var => Ok(TypeAnnotation::Variable(
            pair.as_str().trim_start_matches('\'').to_string(),
        )),
        Rule::generic_type => {
            let mut inner = pair.into_inner();
            let name = next_pair(&mut inner, "generic type name")?.as_str().to_string();
            let args = inner.map(build_type_expr).collect::<Result<Vec<_>, _>>()?;
            Ok(TypeAnnotation::Generic { name, args })
        }
        Rule::tuple_type => {
            let elems = pair
                .into_inner()
                .map(build_type_expr)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeAnnotation::Tuple(elems))
        }
        Rule::record_type => {
            let mut fields = Vec::new();
            for field in pair.into_inner() {
                let mut inner = field.into_inner();
                let name = next_pair(&mut inner, "field name")?.as_str().to_string();
                let ty = build_type_expr(next_pair(&mut inner, "field type")?)?;
                fields.push((name, ty));
            }
            Ok(TypeAnnotation::Record(fields))
        }
        Rule::fn_type => {
            let mut types = pair
                .into_inner()
                .map(build_type_expr)
                .collect::<Result<Vec<_>, _>>()?;
            // The grammar guarantees a return type as the last child.
            let ret = types
                .pop()
                .ok_or_else(|| ParseError::MissingToken("return type".to_string()))?;
            Ok(TypeAnnotation::Function {
                params: types,
                ret: Box::new(ret),
            })
        }
        _ => Err(unexpected_rule_error("type expression", &pair)),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::TypeAnnotation;
    use crate::parser::parse_type_annotation;

    fn named(n: &str) -> TypeAnnotation {
        TypeAnnotation::Named(n.to_string())
    }

    #[test]
    fn test_generic_and_function_types() {
        assert_eq!(
            parse_type_annotation("list<int>").unwrap(),
            TypeAnnotation::Generic {
                name: "list".to_string(),
                args: vec![named("int")]
            }
        );
        assert_eq!(
            parse_type_annotation("fn(int, str) -> bool").unwrap(),
            TypeAnnotation::Function {
                params: vec![named("int"), named("str")],
                ret: Box::new(named("bool")),
            }
        );
    }

    #[test]
    fn test_parenthesized_type_is_not_a_tuple() {
        assert_eq!(parse_type_annotation("(int)").unwrap(), named("int"));
        assert_eq!(
            parse_type_annotation("(int,)").unwrap(),
            TypeAnnotation::Tuple(vec![named("int")])
        );
        assert_eq!(
            parse_type_annotation("()").unwrap(),
            TypeAnnotation::Tuple(vec![])
        );
    }

    #[test]
    fn test_record_and_variable_types() {
        assert_eq!(
            parse_type_annotation("{x: int, tag: 'a}").unwrap(),
            TypeAnnotation::Record(vec![
                ("x".to_string(), named("int")),
                ("tag".to_string(), TypeAnnotation::Variable("a".to_string())),
            ])
        );
    }
}
