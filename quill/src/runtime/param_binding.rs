use crate::ast::{ParamList, Parameter};
use crate::error_reporting::SourceLocation;
use crate::runtime::values::{Arity, Function};
use crate::runtime::{RuntimeError, RuntimeResult, Value};

/// Parameter name and bound value, in declaration order.
pub type BoundParams = Vec<(String, Value)>;

/// Fails with an arity error unless `function` accepts `supplied` arguments.
pub fn check_arity(
    function: &Function,
    supplied: usize,
    location: Option<&SourceLocation>,
) -> RuntimeResult<()> {
    check_arity_of(&function.name, &function.arity(), supplied, location)
}

pub fn check_arity_of(
    name: &str,
    arity: &Arity,
    supplied: usize,
    location: Option<&SourceLocation>,
) -> RuntimeResult<()> {
    if arity.accepts(supplied) {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            function: name.to_string(),
            expected: arity.to_string(),
            actual: supplied,
            location: location.copied(),
        })
    }
}

/// Binds every parameter, in order, through the `bind` callback.
///
/// The callback receives the parameter and the supplied argument, or `None`
/// when the caller left it out, and returns the value it bound. Arity must
/// already have been checked, so a missing argument always has a default.
pub fn bind_parameters<F>(
    params: &ParamList,
    args: Vec<Value>,
    mut bind: F,
) -> RuntimeResult<BoundParams>
where
    F: FnMut(&Parameter, Option<Value>) -> RuntimeResult<Value>,
{
    let mut supplied = args.into_iter();
    let mut bound: BoundParams = Vec::with_capacity(params.len());
    for param in params {
        let arg = supplied.next();
        if arg.is_none() && param.default.is_none() {
            return Err(RuntimeError::Generic(format!(
                "no argument or default for parameter '{}'",
                param.name
            )));
        }
        let value = bind(param, arg)?;
        bound.push((param.name.clone(), value));
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Literal, ParamShape};

    fn params() -> ParamList {
        ParamList::normalize(ParamShape::List(vec![
            Parameter::named("a"),
            Parameter::named("b").with_default(Expression::Literal(Literal::Integer(7))),
        ]))
    }

    #[test]
    fn bind_supplied_and_default() {
        let res = bind_parameters(&params(), vec![Value::Integer(1)], |param, arg| {
            // very small fake evaluator supporting integer literal defaults only
            match (arg, &param.default) {
                (Some(v), _) => Ok(v),
                (None, Some(Expression::Literal(Literal::Integer(n)))) => Ok(Value::Integer(*n)),
                _ => Err(RuntimeError::new("unsupported")),
            }
        });

        let bound = res.unwrap();
        assert_eq!(
            bound,
            vec![
                ("a".to_string(), Value::Integer(1)),
                ("b".to_string(), Value::Integer(7)),
            ]
        );
    }

    #[test]
    fn arity_errors_name_the_function() {
        let f = Function::new("pair", params(), None, vec![]);
        assert!(check_arity(&f, 1, None).is_ok());
        match check_arity(&f, 3, Some(&SourceLocation::new(1, 1))) {
            Err(RuntimeError::ArityMismatch {
                function,
                expected,
                actual,
                location,
            }) => {
                assert_eq!(function, "pair");
                assert_eq!(expected, "1-2");
                assert_eq!(actual, 3);
                assert_eq!(location, Some(SourceLocation::new(1, 1)));
            }
            other => panic!("expected arity mismatch, got {:?}", other),
        }
    }
}
