use std::io::Write;

use gc::Gc;

use crate::object::{Builtin, EvaluationError, Object};

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
];

pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name).copied()
}

fn check_argument_count(expected: usize, args: &[Gc<Object>]) -> Result<(), EvaluationError> {
    if args.len() != expected {
        return Err(EvaluationError::WrongArgumentCount {
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn unsupported(function: &'static str, arg: &Object) -> EvaluationError {
    EvaluationError::UnsupportedArgument {
        function,
        got: arg.type_name(),
    }
}

fn builtin_len(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::String(s) => Ok(Object::integer(s.chars().count() as i64)),
        Object::Array(arr) => Ok(Object::integer(arr.len() as i64)),
        other => Err(unsupported("len", other)),
    }
}

fn builtin_first(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.first().cloned().unwrap_or_else(Object::null)),
        other => Err(unsupported("first", other)),
    }
}

fn builtin_last(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) => Ok(arr.last().cloned().unwrap_or_else(Object::null)),
        other => Err(unsupported("last", other)),
    }
}

fn builtin_rest(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(1, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) => {
            if arr.is_empty() {
                return Ok(Object::null());
            }
            Ok(Object::array(arr[1..].to_owned()))
        }
        other => Err(unsupported("rest", other)),
    }
}

fn builtin_push(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    check_argument_count(2, &args)?;
    match args[0].as_ref() {
        Object::Array(arr) => {
            let mut new_arr = arr.clone();
            new_arr.push(args[1].clone());
            Ok(Object::array(new_arr))
        }
        other => Err(unsupported("push", other)),
    }
}

fn builtin_puts(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    puts(&mut std::io::stdout().lock(), &args)
        .map_err(|err| EvaluationError::Output(err.to_string()))?;
    Ok(Object::null())
}

/// Writes the Inspect form of each argument to `out`, one per line.
pub fn puts(out: &mut impl Write, args: &[Gc<Object>]) -> std::io::Result<()> {
    for arg in args {
        writeln!(out, "{}", arg)?;
    }
    out.flush()
}
