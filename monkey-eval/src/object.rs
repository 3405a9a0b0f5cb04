use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use gc::{Finalize, Gc, Trace};

use crate::environment::Environment;
use monkey_syntax::ast;

use thiserror::Error;

#[derive(Debug, PartialEq, Clone, Trace, Finalize)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<Gc<Object>>),
    Hash(HashMap<HashKey, (Gc<Object>, Gc<Object>)>),
    Function(Function),
    Builtin(Builtin),
    Null,
}

thread_local! {
    static NULL: Gc<Object> = Gc::new(Object::Null);
    static TRUE: Gc<Object> = Gc::new(Object::Boolean(true));
    static FALSE: Gc<Object> = Gc::new(Object::Boolean(false));
}

impl Object {
    pub fn null() -> Gc<Object> {
        NULL.with(|x| x.clone())
    }
    pub fn boolean(value: bool) -> Gc<Object> {
        if value {
            TRUE.with(|x| x.clone())
        } else {
            FALSE.with(|x| x.clone())
        }
    }
    pub fn integer(value: i64) -> Gc<Object> {
        Gc::new(Object::Integer(value))
    }
    pub fn string(value: String) -> Gc<Object> {
        Gc::new(Object::String(value))
    }
    pub fn array(array: Vec<Gc<Object>>) -> Gc<Object> {
        Gc::new(Object::Array(array))
    }
    pub fn hash(hash: HashMap<HashKey, (Gc<Object>, Gc<Object>)>) -> Gc<Object> {
        Gc::new(Object::Hash(hash))
    }
    pub fn function(
        parameters: Vec<ast::Identifier>,
        body: ast::BlockStatement,
        env: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Function(Function {
            parameters,
            body,
            env,
        }))
    }
    pub fn builtin(func: Builtin) -> Gc<Object> {
        Gc::new(Object::Builtin(func))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::String(_) => "STRING",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Null => "NULL",
        }
    }

    /// `false` and `null` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }
}

/// The Inspect form printed by the REPL and `puts`.
impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Array(array) => {
                write!(f, "[")?;
                for (i, element) in array.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Hash(hash) => {
                write!(f, "{{")?;
                for (i, (key, value)) in hash.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Object::Function(function) => {
                write!(f, "fn(")?;
                for (i, parameter) in function.parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", parameter)?;
                }
                write!(f, ") {}", function.body)
            }
            Object::Builtin(_) => write!(f, "builtin function"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Trace, Finalize, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl TryFrom<&Object> for HashKey {
    type Error = EvaluationError;

    fn try_from(value: &Object) -> Result<Self, Self::Error> {
        match value {
            Object::Integer(int) => Ok(HashKey::Integer(*int)),
            Object::String(str) => Ok(HashKey::String(str.clone())),
            Object::Boolean(bool) => Ok(HashKey::Boolean(*bool)),
            _ => Err(EvaluationError::UnusableHashKey(value.type_name())),
        }
    }
}

#[derive(Clone, Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub parameters: Vec<ast::Identifier>,
    #[unsafe_ignore_trace]
    pub body: ast::BlockStatement,
    /// The environment active where the function literal was evaluated. A
    /// function stored in that same environment forms a cycle, which the
    /// collector reclaims once neither is reachable.
    pub env: Environment,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && self.body == other.body
            && self.env.ptr_eq(&other.env)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field(
                "parameters",
                &self
                    .parameters
                    .iter()
                    .map(|id| id.name.as_ref())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

pub type BuiltinFunction = fn(Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFunction,
}

// Builtins hold no objects.
impl Finalize for Builtin {}
unsafe impl Trace for Builtin {
    gc::unsafe_empty_trace!();
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

/// Non-local exits threaded through the evaluator as the `Err` side of its
/// results: a `return` unwinding to the nearest function, or a runtime error
/// unwinding to the top.
#[derive(Debug, PartialEq)]
pub enum Signal {
    Return(Gc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for Signal {
    fn from(value: EvaluationError) -> Self {
        Signal::Error(value)
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("type mismatch: {left} {operation} {right}")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
        operation: ast::InfixOperationKind,
    },
    #[error("unknown operator: {left} {operation} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        right: &'static str,
        operation: ast::InfixOperationKind,
    },
    #[error("unknown operator: {operation}{right}")]
    UnknownPrefixOperator {
        right: &'static str,
        operation: ast::PrefixOperationKind,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("identifier not found: {0}")]
    IdentifierNotFound(Rc<str>),
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("wrong number of arguments: want={expected}, got={actual}")]
    WrongArgumentCount { expected: usize, actual: usize },
    #[error("argument to `{function}` not supported, got {got}")]
    UnsupportedArgument {
        function: &'static str,
        got: &'static str,
    },
    #[error("index operator not supported: {0}")]
    IndexNotSupported(&'static str),
    #[error("index must be an integer, got {0}")]
    IndexNotInteger(&'static str),
    #[error("unusable as hash key: {0}")]
    UnusableHashKey(&'static str),
    #[error("could not write output: {0}")]
    Output(String),
}
