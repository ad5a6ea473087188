// Turns written annotations into types.

use super::env::TypeEnvironment;
use super::ty::{Type, ANY, BOOL, FLOAT, INT, STR, UNIT};
use crate::ast::TypeAnnotation;

/// Maps a built-in type name (and its aliases) to its canonical spelling.
pub fn builtin_type_name(name: &str) -> Option<&'static str> {
    match name {
        "int" | "integer" => Some(INT),
        "float" => Some(FLOAT),
        "str" | "string" => Some(STR),
        "bool" | "boolean" => Some(BOOL),
        "unit" | "none" => Some(UNIT),
        "any" => Some(ANY),
        _ => None,
    }
}

/// Resolves `annotation` against the aliases visible in `env`.
///
/// Names that are neither built in nor bound in `env` become primitives of
/// that name; the runtime checker accepts any value for them.
pub fn resolve_annotation(annotation: &TypeAnnotation, env: &TypeEnvironment) -> Type {
    match annotation {
        TypeAnnotation::Named(name) => {
            if let Some(builtin) = builtin_type_name(name) {
                return Type::primitive(builtin);
            }
            match env.lookup(name) {
                // Polymorphic aliases keep their variables; the checker is
                // permissive about variables so nothing needs instantiating.
                Some(scheme) => scheme.ty.clone(),
                None => Type::Primitive(name.clone()),
            }
        }
        TypeAnnotation::Variable(name) => Type::Variable(name.clone()),
        TypeAnnotation::Generic { name, args } => Type::Generic {
            name: name.clone(),
            args: args.iter().map(|a| resolve_annotation(a, env)).collect(),
        },
        TypeAnnotation::Tuple(elems) if elems.is_empty() => Type::unit(),
        TypeAnnotation::Tuple(elems) => {
            Type::Tuple(elems.iter().map(|e| resolve_annotation(e, env)).collect())
        }
        TypeAnnotation::Record(fields) => Type::record(
            fields
                .iter()
                .map(|(name, ann)| (name.clone(), resolve_annotation(ann, env))),
        ),
        TypeAnnotation::Function { params, ret } => Type::function(
            params.iter().map(|p| resolve_annotation(p, env)).collect(),
            resolve_annotation(ret, env),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_checking::ty::TypeScheme;

    fn named(name: &str) -> TypeAnnotation {
        TypeAnnotation::Named(name.to_string())
    }

    #[test]
    fn test_builtin_names_and_aliases() {
        let env = TypeEnvironment::new();
        assert_eq!(resolve_annotation(&named("integer"), &env), Type::int());
        assert_eq!(resolve_annotation(&named("string"), &env), Type::string());
        assert_eq!(resolve_annotation(&named("none"), &env), Type::unit());
        assert_eq!(
            resolve_annotation(&TypeAnnotation::Tuple(vec![]), &env),
            Type::unit()
        );
    }

    #[test]
    fn test_alias_resolves_through_environment() {
        let mut env = TypeEnvironment::new();
        env.define(
            "Point",
            TypeScheme::monomorphic(Type::record(vec![("x", Type::int()), ("y", Type::int())])),
        );

        let ann = TypeAnnotation::Generic {
            name: "list".to_string(),
            args: vec![named("Point")],
        };
        assert_eq!(
            resolve_annotation(&ann, &env).to_string(),
            "list<{x: int, y: int}>"
        );
    }

    #[test]
    fn test_unknown_name_stays_primitive() {
        let env = TypeEnvironment::new();
        assert_eq!(
            resolve_annotation(&named("Widget"), &env),
            Type::primitive("Widget")
        );
    }

    #[test]
    fn test_function_annotation() {
        let env = TypeEnvironment::new();
        let ann = TypeAnnotation::Function {
            params: vec![named("int"), TypeAnnotation::Variable("a".to_string())],
            ret: Box::new(named("bool")),
        };
        assert_eq!(resolve_annotation(&ann, &env).to_string(), "fn(int, 'a) -> bool");
    }
}
