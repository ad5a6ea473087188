// Quill Evaluator - Executes parsed programs

use crate::ast::{BinaryOp, Expression, FunctionDef, Literal, Program, Statement, UnaryOp};
use crate::config::TypeConfig;
use crate::error_reporting::SourceLocation;
use crate::runtime::diagnostics::{DiagnosticReporter, LogReporter};
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::execution_outcome::Flow;
use crate::runtime::param_binding::{bind_parameters, check_arity, check_arity_of};
use crate::runtime::stdlib::StandardLibrary;
use crate::runtime::type_checker::{CheckContext, Enforcement, RuntimeTypeChecker};
use crate::runtime::values::{Function, Value};
use crate::type_checking::{resolve_annotation, TypeEnvironment, TypeScheme};
use indexmap::IndexMap;
use std::io::{self, Write};
use std::rc::Rc;

pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 512;

// Remaining stack below which evaluation moves onto a fresh segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

pub struct Evaluator {
    env: Environment,
    type_env: Rc<TypeEnvironment>,
    type_config: TypeConfig,
    checker: RuntimeTypeChecker,
    reporter: Box<dyn DiagnosticReporter>,
    output: Box<dyn Write>,
    recursion_depth: usize,
    max_recursion_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(TypeConfig::new())
    }
}

impl Evaluator {
    /// Create a new evaluator with the standard library loaded.
    pub fn new(type_config: TypeConfig) -> Self {
        Evaluator {
            env: StandardLibrary::create_global_environment(),
            type_env: Rc::new(TypeEnvironment::new()),
            type_config,
            checker: RuntimeTypeChecker::new(),
            reporter: Box::new(LogReporter),
            output: Box::new(io::stdout()),
            recursion_depth: 0,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }

    /// Evaluator configured from the process-wide default.
    pub fn with_global_config() -> Self {
        Self::new(crate::config::type_config::global())
    }

    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn with_reporter(mut self, reporter: impl DiagnosticReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn type_config(&self) -> &TypeConfig {
        &self.type_config
    }

    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth
    }

    /// Runs every top-level statement in the global scope.
    ///
    /// The result is the value of the last statement, or the value of a
    /// top-level `return`, which ends the program early.
    pub fn execute(&mut self, program: &Program) -> RuntimeResult<Value> {
        log::debug!(
            "executing {} statements (type checking: {})",
            program.statements.len(),
            self.type_config.effective_mode()
        );
        let result = match self.exec_statements(&program.statements)? {
            Flow::Normal(value) | Flow::Return(value) => Ok(value),
            Flow::Break => Err(RuntimeError::BreakOutsideLoop("break".to_string())),
            Flow::Continue => Err(RuntimeError::BreakOutsideLoop("continue".to_string())),
        };
        self.output.flush()?;
        result
    }

    /// Pushes a value scope and a child type scope around `f`, restoring
    /// both whatever `f` returns.
    fn with_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> RuntimeResult<T>,
    ) -> RuntimeResult<T> {
        self.env.push_scope();
        let outer_types = Rc::clone(&self.type_env);
        self.type_env = Rc::new(TypeEnvironment::with_parent(Rc::clone(&outer_types)));

        let result = f(self);

        self.type_env = outer_types;
        self.env.pop_scope();
        result
    }

    fn exec_statements(&mut self, statements: &[Statement]) -> RuntimeResult<Flow> {
        let mut last = Value::Unit;
        for statement in statements {
            match self.exec_stmt(statement)? {
                Flow::Normal(value) => last = value,
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn exec_block(&mut self, statements: &[Statement]) -> RuntimeResult<Flow> {
        self.with_scope(|ev| ev.exec_statements(statements))
    }

    pub fn exec_stmt(&mut self, statement: &Statement) -> RuntimeResult<Flow> {
        match statement {
            Statement::Let { name, value, .. } => {
                let value = self.eval_expr(value)?;
                self.env.define(name, value);
                Ok(Flow::unit())
            }
            Statement::Assign {
                name,
                value,
                location,
            } => {
                let value = self.eval_expr(value)?;
                match self.env.assign(name, value) {
                    Ok(()) => Ok(Flow::unit()),
                    Err(_) => Err(RuntimeError::UndefinedSymbol {
                        name: name.clone(),
                        location: *location,
                    }),
                }
            }
            Statement::FunctionDef(def) => Ok(Flow::Normal(self.define_function(def))),
            Statement::TypeAlias { name, annotation } => {
                let ty = resolve_annotation(annotation, &self.type_env);
                log::debug!("type alias {} = {}", name, ty);
                Rc::make_mut(&mut self.type_env).define(name, TypeScheme::monomorphic(ty));
                Ok(Flow::unit())
            }
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Unit,
                };
                Ok(Flow::Return(value))
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.exec_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch)
                } else {
                    Ok(Flow::unit())
                }
            }
            Statement::While { condition, body } => {
                while self.eval_expr(condition)?.is_truthy() {
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Normal(_) | Flow::Continue => continue,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                    }
                }
                Ok(Flow::unit())
            }
            Statement::Break => Ok(Flow::Break),
            Statement::Continue => Ok(Flow::Continue),
            Statement::Expression(expr) => Ok(Flow::Normal(self.eval_expr(expr)?)),
        }
    }

    /// Registers the function in the current scope. Neither the body nor
    /// any default expression is evaluated here.
    fn define_function(&mut self, def: &FunctionDef) -> Value {
        let function = Function::new(
            &def.name,
            def.params.clone(),
            def.return_type.clone(),
            def.body.clone(),
        );
        log::debug!("define {} (arity {})", def.name, function.arity());
        self.env.define(&def.name, Value::Function(Rc::new(function)));
        Value::String(def.name.clone())
    }

    /// Evaluate an expression, growing the native stack for deep recursion.
    pub fn eval_expr(&mut self, expr: &Expression) -> RuntimeResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expression) -> RuntimeResult<Value> {
        match expr {
            Expression::Literal(lit) => Ok(self.eval_literal(lit)),
            Expression::Variable { name, location } => {
                self.env
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedSymbol {
                        name: name.clone(),
                        location: *location,
                    })
            }
            Expression::List(items) => Ok(Value::List(self.eval_all(items)?)),
            Expression::Tuple(items) => Ok(Value::Tuple(self.eval_all(items)?)),
            Expression::Record(fields) => {
                let mut record = IndexMap::with_capacity(fields.len());
                for (name, expr) in fields {
                    let value = self.eval_expr(expr)?;
                    record.insert(name.clone(), value);
                }
                Ok(Value::Record(record))
            }
            Expression::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                self.eval_unary(*op, value)
            }
            Expression::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expression::Field {
                target,
                field,
                location,
            } => match self.eval_expr(target)? {
                Value::Record(fields) => {
                    fields
                        .get(field)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UnknownField {
                            field: field.clone(),
                            location: *location,
                        })
                }
                other => Err(RuntimeError::TypeError {
                    expected: "record".to_string(),
                    actual: other.type_name().to_string(),
                    operation: format!("field access .{}", field),
                }),
            },
            Expression::Index { target, index, .. } => {
                let target = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                Self::eval_index(target, index)
            }
            Expression::Call {
                callee,
                args,
                location,
            } => {
                let function =
                    self.env
                        .lookup(callee)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UndefinedSymbol {
                            name: callee.clone(),
                            location: *location,
                        })?;
                // Arguments are evaluated in the caller's scope.
                let args = self.eval_all(args)?;
                self.call_value(callee, function, args, location.as_ref())
            }
        }
    }

    fn eval_literal(&self, lit: &Literal) -> Value {
        match lit {
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Unit => Value::Unit,
        }
    }

    fn eval_all(&mut self, exprs: &[Expression]) -> RuntimeResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval_expr(e)).collect()
    }

    /// Calls any callable value with already-evaluated arguments.
    pub fn call_value(
        &mut self,
        name: &str,
        callee: Value,
        args: Vec<Value>,
        location: Option<&SourceLocation>,
    ) -> RuntimeResult<Value> {
        match callee {
            Value::Function(function) => self.invoke(&function, args, location),
            Value::Builtin(builtin) => {
                check_arity_of(builtin.name, &builtin.arity, args.len(), location)?;
                (builtin.func)(&args, self.output.as_mut())
            }
            other => Err(RuntimeError::NotCallable {
                name: name.to_string(),
                kind: other.type_name().to_string(),
                location: location.copied(),
            }),
        }
    }

    fn invoke(
        &mut self,
        function: &Rc<Function>,
        args: Vec<Value>,
        location: Option<&SourceLocation>,
    ) -> RuntimeResult<Value> {
        check_arity(function, args.len(), location)?;

        if self.recursion_depth >= self.max_recursion_depth {
            return Err(RuntimeError::StackOverflow(self.max_recursion_depth));
        }
        self.recursion_depth += 1;
        log::debug!("call {} (depth {})", function.name, self.recursion_depth);

        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.with_scope(|ev| ev.run_function(function, args, location.copied()))
        });

        self.recursion_depth -= 1;
        result
    }

    /// Body of a call, run inside the call's fresh scope.
    fn run_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        location: Option<SourceLocation>,
    ) -> RuntimeResult<Value> {
        let bound = bind_parameters(&function.params, args, |param, arg| {
            let value = match (arg, &param.default) {
                (Some(value), _) => value,
                // Defaults see the parameters bound before them.
                (None, Some(default)) => self.eval_expr(default)?,
                (None, None) => {
                    return Err(RuntimeError::Generic(format!(
                        "no value for parameter '{}'",
                        param.name
                    )))
                }
            };
            self.env.define(&param.name, value.clone());
            Ok(value)
        })?;

        let enforcement = if function.is_annotated() {
            Enforcement::from_config(&self.type_config)
        } else {
            None
        };

        if let Some(enforcement) = enforcement {
            let mut ctx = CheckContext {
                enforcement,
                types: &self.type_env,
                reporter: self.reporter.as_mut(),
                location,
                file: self.type_config.current_file(),
            };
            self.checker.check_arguments(function, &bound, &mut ctx)?;
        }

        let value = match self.exec_statements(&function.body)? {
            Flow::Normal(_) => Value::Unit,
            Flow::Return(value) => value,
            Flow::Break => return Err(RuntimeError::BreakOutsideLoop("break".to_string())),
            Flow::Continue => {
                return Err(RuntimeError::BreakOutsideLoop("continue".to_string()))
            }
        };

        if let Some(enforcement) = enforcement {
            let mut ctx = CheckContext {
                enforcement,
                types: &self.type_env,
                reporter: self.reporter.as_mut(),
                location,
                file: self.type_config.current_file(),
            };
            self.checker.check_return(function, &value, &mut ctx)?;
        }
        Ok(value)
    }

    fn eval_unary(&self, op: UnaryOp, value: Value) -> RuntimeResult<Value> {
        match (op, value) {
            (UnaryOp::Not, value) => Ok(Value::Boolean(!value.is_truthy())),
            (UnaryOp::Neg, Value::Integer(n)) => n
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::new("integer overflow in negation")),
            (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
            (UnaryOp::Neg, other) => Err(operand_error("-", "int or float", &other)),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
    ) -> RuntimeResult<Value> {
        // Short-circuit operators evaluate the right side only when needed.
        match op {
            BinaryOp::And => {
                if !self.eval_expr(left)?.is_truthy() {
                    return Ok(Value::Boolean(false));
                }
                return Ok(Value::Boolean(self.eval_expr(right)?.is_truthy()));
            }
            BinaryOp::Or => {
                if self.eval_expr(left)?.is_truthy() {
                    return Ok(Value::Boolean(true));
                }
                return Ok(Value::Boolean(self.eval_expr(right)?.is_truthy()));
            }
            _ => {}
        }

        let left = self.eval_expr(left)?;
        let right = self.eval_expr(right)?;
        match op {
            BinaryOp::Eq => Ok(Value::Boolean(left == right)),
            BinaryOp::Ne => Ok(Value::Boolean(left != right)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                compare(op, &left, &right)
            }
            _ => arithmetic(op, left, right),
        }
    }

    fn eval_index(target: Value, index: Value) -> RuntimeResult<Value> {
        let i = match index {
            Value::Integer(i) => i,
            other => return Err(operand_error("[]", "int index", &other)),
        };
        let element = |items: &[Value]| {
            usize::try_from(i)
                .ok()
                .and_then(|idx| items.get(idx).cloned())
                .ok_or(RuntimeError::IndexOutOfBounds {
                    index: i,
                    length: items.len(),
                })
        };
        match target {
            Value::List(items) | Value::Tuple(items) => element(&items),
            Value::String(s) => {
                let chars: Vec<Value> = s.chars().map(|c| Value::String(c.to_string())).collect();
                element(&chars)
            }
            other => Err(operand_error("[]", "list, tuple or str", &other)),
        }
    }
}

fn operand_error(operation: &str, expected: &str, actual: &Value) -> RuntimeError {
    RuntimeError::TypeError {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
        operation: operation.to_string(),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> RuntimeResult<Value> {
    let symbol = op.symbol();
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div | BinaryOp::Mod if b == 0 => {
                    return Err(RuntimeError::DivisionByZero)
                }
                BinaryOp::Div => a.checked_div(b),
                BinaryOp::Mod => a.checked_rem(b),
                _ => unreachable!("non-arithmetic operator {}", symbol),
            };
            result
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::Generic(format!("integer overflow in '{}'", symbol)))
        }
        (Value::Integer(a), Value::Float(b)) => float_arithmetic(op, a as f64, b),
        (Value::Float(a), Value::Integer(b)) => float_arithmetic(op, a, b as f64),
        (Value::Float(a), Value::Float(b)) => float_arithmetic(op, a, b),
        (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
            Ok(Value::String(a + &b))
        }
        (Value::List(mut a), Value::List(b)) if op == BinaryOp::Add => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (left, right) => Err(RuntimeError::TypeError {
            expected: "numbers".to_string(),
            actual: format!("{} and {}", left.type_name(), right.type_name()),
            operation: symbol.to_string(),
        }),
    }
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> RuntimeResult<Value> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return Err(RuntimeError::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        _ => unreachable!("non-arithmetic operator {}", op.symbol()),
    };
    Ok(Value::Float(result))
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> RuntimeResult<Value> {
    use std::cmp::Ordering;
    let ordering = match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            return Err(RuntimeError::TypeError {
                expected: "two numbers or two strings".to_string(),
                actual: format!("{} and {}", left.type_name(), right.type_name()),
                operation: op.symbol().to_string(),
            })
        }
    };
    let result = match (op, ordering) {
        (_, None) => false,
        (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
        (BinaryOp::Le, Some(o)) => o != Ordering::Greater,
        (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
        (BinaryOp::Ge, Some(o)) => o != Ordering::Less,
        _ => unreachable!("non-comparison operator {}", op.symbol()),
    };
    Ok(Value::Boolean(result))
}
