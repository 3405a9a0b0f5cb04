use std::collections::HashMap;

use gc::Gc;

use crate::builtins;
use crate::environment::Environment;
use crate::object::{EvaluationError, Function, HashKey, Object, Signal};
use monkey_syntax::ast;
use monkey_syntax::ast::{Expression, InfixOperationKind, PrefixOperationKind};

/// Evaluates every statement of `program` in `environment`, stopping at the
/// first `return` or runtime error. An empty program evaluates to `null`.
#[tracing::instrument(level = "trace", skip_all, fields(statements = program.statements.len()))]
pub fn eval_program(
    program: &ast::Program,
    environment: &Environment,
) -> Result<Gc<Object>, EvaluationError> {
    let mut output = Object::null();
    for statement in &program.statements {
        let result = eval_statement(statement, environment);

        match result {
            Err(Signal::Return(value)) => return Ok(value),
            Err(Signal::Error(error)) => return Err(error),
            Ok(object) => output = object,
        };
    }
    Ok(output)
}

fn eval_statement(
    statement: &ast::Statement,
    environment: &Environment,
) -> Result<Gc<Object>, Signal> {
    match statement {
        ast::Statement::Expression(expression) => eval_expression(expression, environment),
        ast::Statement::Return(statement) => eval_return_statement(statement, environment),
        ast::Statement::Let(statement) => eval_let_statement(statement, environment),
    }
}

fn eval_let_statement(
    statement: &ast::LetStatement,
    environment: &Environment,
) -> Result<Gc<Object>, Signal> {
    let value = eval_expression(&statement.value, environment)?;
    environment.set(statement.identifier.name.clone(), value);
    Ok(Object::null())
}

fn eval_return_statement(
    statement: &ast::ReturnStatement,
    environment: &Environment,
) -> Result<Gc<Object>, Signal> {
    let value = eval_expression(&statement.value, environment)?;
    Err(Signal::Return(value))
}

fn eval_expression(
    expression: &Expression,
    environment: &Environment,
) -> Result<Gc<Object>, Signal> {
    match expression {
        Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
        Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
        Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
        Expression::ArrayLiteral(array) => Ok(Object::array(eval_expressions(array, environment)?)),
        Expression::HashLiteral(literal) => eval_hash_literal(literal, environment),
        Expression::Identifier(identifier) => Ok(eval_identifier(identifier, environment)?),
        Expression::PrefixOperation(kind, expression) => {
            let right = eval_expression(expression, environment)?;
            Ok(eval_prefix_operation(*kind, right)?)
        }
        Expression::InfixOperation(kind, left, right) => {
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            Ok(eval_infix_operation(*kind, left, right)?)
        }
        Expression::IfExpression {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, environment)?;
            if condition.is_truthy() {
                eval_block_statement(consequence, environment)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, environment)
            } else {
                Ok(Object::null())
            }
        }
        Expression::FunctionLiteral { parameters, body } => Ok(Object::function(
            parameters.clone(),
            body.clone(),
            environment.clone(),
        )),
        Expression::CallExpression {
            function,
            arguments,
        } => {
            let function = eval_expression(function, environment)?;
            let arguments = eval_expressions(arguments, environment)?;
            Ok(apply_function(&function, arguments)?)
        }
        Expression::IndexExpression { left, index } => {
            let left = eval_expression(left, environment)?;
            let index = eval_expression(index, environment)?;
            Ok(eval_index_expression(&left, &index)?)
        }
    }
}

// Variables shadow builtins.
fn eval_identifier(
    identifier: &ast::Identifier,
    environment: &Environment,
) -> Result<Gc<Object>, EvaluationError> {
    environment
        .get(&identifier.name)
        .or_else(|| builtins::lookup(&identifier.name).map(Object::builtin))
        .ok_or_else(|| EvaluationError::IdentifierNotFound(identifier.name.clone()))
}

fn eval_hash_literal(
    literal: &[(Expression, Expression)],
    environment: &Environment,
) -> Result<Gc<Object>, Signal> {
    let mut hashmap = HashMap::new();
    for (key, value) in literal {
        let key = eval_expression(key, environment)?;
        let hashed_key = HashKey::try_from(key.as_ref())?;
        let value = eval_expression(value, environment)?;
        hashmap.insert(hashed_key, (key, value));
    }
    Ok(Object::hash(hashmap))
}

fn eval_expressions(
    arguments: &[Expression],
    environment: &Environment,
) -> Result<Vec<Gc<Object>>, Signal> {
    let mut result = Vec::with_capacity(arguments.len());
    for argument in arguments {
        result.push(eval_expression(argument, environment)?);
    }
    Ok(result)
}

fn apply_function(
    function: &Gc<Object>,
    arguments: Vec<Gc<Object>>,
) -> Result<Gc<Object>, EvaluationError> {
    match function.as_ref() {
        Object::Function(function) => call_function(function, arguments),
        Object::Builtin(builtin) => {
            tracing::trace!(name = builtin.name, "calling builtin");
            (builtin.func)(arguments)
        }
        other => Err(EvaluationError::NotAFunction(other.type_name())),
    }
}

fn call_function(
    function: &Function,
    arguments: Vec<Gc<Object>>,
) -> Result<Gc<Object>, EvaluationError> {
    if function.parameters.len() != arguments.len() {
        return Err(EvaluationError::WrongArgumentCount {
            expected: function.parameters.len(),
            actual: arguments.len(),
        });
    }
    tracing::trace!(arity = arguments.len(), "applying function");

    let call_environment = Environment::new_enclosed(&function.env);
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        call_environment.set(parameter.name.clone(), argument);
    }

    // `return` stops at the function boundary
    match eval_block_statement(&function.body, &call_environment) {
        Ok(object) => Ok(object),
        Err(Signal::Return(value)) => Ok(value),
        Err(Signal::Error(err)) => Err(err),
    }
}

fn eval_block_statement(
    block: &ast::BlockStatement,
    environment: &Environment,
) -> Result<Gc<Object>, Signal> {
    let block_environment = Environment::new_enclosed(environment);
    let mut result = Object::null();
    for statement in &block.statements {
        result = eval_statement(statement, &block_environment)?;
    }
    Ok(result)
}

fn eval_index_expression(
    left: &Gc<Object>,
    index: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(array), Object::Integer(index)) => Ok(usize::try_from(*index)
            .ok()
            .and_then(|index| array.get(index))
            .cloned()
            .unwrap_or_else(Object::null)),
        (Object::String(string), Object::Integer(index)) => Ok(usize::try_from(*index)
            .ok()
            .and_then(|index| string.chars().nth(index))
            .map(|ch| Object::string(ch.to_string()))
            .unwrap_or_else(Object::null)),
        (Object::Array(_) | Object::String(_), other) => {
            Err(EvaluationError::IndexNotInteger(other.type_name()))
        }
        (Object::Hash(hash), index) => {
            let hashed_index = HashKey::try_from(index)?;
            Ok(hash
                .get(&hashed_index)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(Object::null))
        }
        (other, _) => Err(EvaluationError::IndexNotSupported(other.type_name())),
    }
}

fn eval_prefix_operation(
    kind: PrefixOperationKind,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (kind, right.as_ref()) {
        (PrefixOperationKind::Bang, object) => Ok(Object::boolean(!object.is_truthy())),
        (PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        (PrefixOperationKind::Minus, other) => Err(EvaluationError::UnknownPrefixOperator {
            right: other.type_name(),
            operation: kind,
        }),
    }
}

fn eval_infix_operation(
    kind: InfixOperationKind,
    left: Gc<Object>,
    right: Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(left), Object::Integer(right)) => {
            eval_integer_infix_operation(kind, *left, *right)
        }
        (Object::String(left), Object::String(right)) => {
            eval_string_infix_operation(kind, left, right)
        }
        (Object::Boolean(left), Object::Boolean(right)) if is_equality(kind) => {
            Ok(Object::boolean((left == right) == (kind == InfixOperationKind::Equal)))
        }
        (Object::Null, Object::Null) if is_equality(kind) => {
            Ok(Object::boolean(kind == InfixOperationKind::Equal))
        }
        // Everything else compares by identity
        _ if is_equality(kind) => Ok(Object::boolean(
            Gc::ptr_eq(&left, &right) == (kind == InfixOperationKind::Equal),
        )),
        (left, right) if left.type_name() != right.type_name() => {
            Err(EvaluationError::TypeMismatch {
                left: left.type_name(),
                right: right.type_name(),
                operation: kind,
            })
        }
        (left, right) => Err(EvaluationError::UnknownInfixOperator {
            left: left.type_name(),
            right: right.type_name(),
            operation: kind,
        }),
    }
}

fn is_equality(kind: InfixOperationKind) -> bool {
    matches!(kind, InfixOperationKind::Equal | InfixOperationKind::NotEqual)
}

fn eval_integer_infix_operation(
    kind: InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Gc<Object>, EvaluationError> {
    match kind {
        InfixOperationKind::Plus => Ok(Object::integer(left.wrapping_add(right))),
        InfixOperationKind::Minus => Ok(Object::integer(left.wrapping_sub(right))),
        InfixOperationKind::Multiply => Ok(Object::integer(left.wrapping_mul(right))),
        InfixOperationKind::Divide => match right {
            0 => Err(EvaluationError::DivisionByZero),
            _ => Ok(Object::integer(left.wrapping_div(right))),
        },
        InfixOperationKind::LessThan => Ok(Object::boolean(left < right)),
        InfixOperationKind::GreaterThan => Ok(Object::boolean(left > right)),
        InfixOperationKind::Equal => Ok(Object::boolean(left == right)),
        InfixOperationKind::NotEqual => Ok(Object::boolean(left != right)),
    }
}

fn eval_string_infix_operation(
    kind: InfixOperationKind,
    left: &str,
    right: &str,
) -> Result<Gc<Object>, EvaluationError> {
    match kind {
        InfixOperationKind::Plus => Ok(Object::string(format!("{}{}", left, right))),
        InfixOperationKind::Equal => Ok(Object::boolean(left == right)),
        InfixOperationKind::NotEqual => Ok(Object::boolean(left != right)),
        _ => Err(EvaluationError::UnknownInfixOperator {
            left: "STRING",
            right: "STRING",
            operation: kind,
        }),
    }
}
