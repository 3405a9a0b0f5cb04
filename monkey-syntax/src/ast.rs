use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct LetStatement {
    pub identifier: Identifier,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnStatement {
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    StringLiteral(String),
    BooleanLiteral(bool),
    ArrayLiteral(Vec<Expression>),
    HashLiteral(Vec<(Expression, Expression)>),
    PrefixOperation(PrefixOperationKind, Box<Expression>),
    InfixOperation(InfixOperationKind, Box<Expression>, Box<Expression>),
    IfExpression {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    FunctionLiteral {
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    CallExpression {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    IndexExpression {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InfixOperationKind {
    Plus,
    Minus,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
    Multiply,
    Divide,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PrefixOperationKind {
    Minus,
    Bang,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub name: Rc<str>,
}

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for LetStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {} = {};", self.identifier, self.value)
    }
}

impl Display for ReturnStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "return {};", self.value)
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{")?;
        for statement in &self.statements {
            writeln!(f, "  {}", statement)?;
        }
        write!(f, "}}")
    }
}

fn write_separated<T: Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> std::fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(ident) => write!(f, "{}", ident),
            IntegerLiteral(val) => write!(f, "{}", val),
            StringLiteral(val) => write!(f, "\"{}\"", val),
            BooleanLiteral(val) => write!(f, "{}", val),
            ArrayLiteral(arr) => {
                write!(f, "[")?;
                write_separated(f, arr)?;
                write!(f, "]")
            }
            HashLiteral(hash) => {
                write!(f, "{{")?;
                write_separated(f, hash.iter().map(|(key, value)| format!("{}: {}", key, value)))?;
                write!(f, "}}")
            }
            PrefixOperation(kind, expr) => write!(f, "({}{})", kind, expr),
            InfixOperation(kind, left, right) => write!(f, "({} {} {})", left, kind, right),
            IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            FunctionLiteral { parameters, body } => {
                write!(f, "fn(")?;
                write_separated(f, parameters)?;
                write!(f, ") {}", body)
            }
            CallExpression {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            IndexExpression { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;
        match self {
            Let(statement) => write!(f, "{}", statement),
            Return(statement) => write!(f, "{}", statement),
            Expression(expression) => write!(f, "{};", expression),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl PrefixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use PrefixOperationKind::*;
        match self {
            Minus => "-",
            Bang => "!",
        }
    }
}

impl Display for PrefixOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl InfixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use InfixOperationKind::*;
        match self {
            Plus => "+",
            Minus => "-",
            LessThan => "<",
            GreaterThan => ">",
            Equal => "==",
            NotEqual => "!=",
            Multiply => "*",
            Divide => "/",
        }
    }
}

impl Display for InfixOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Identifier {
        Identifier { name: name.into() }
    }

    #[test]
    fn test_let_statement_display() {
        let program = Program {
            statements: vec![Statement::Let(LetStatement {
                identifier: ident("myVar"),
                value: Expression::Identifier(ident("anotherVar")),
            })],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar;\n");
    }

    #[test]
    fn test_nested_display() {
        let function = Expression::FunctionLiteral {
            parameters: vec![ident("x"), ident("y")],
            body: BlockStatement {
                statements: vec![Statement::Return(ReturnStatement {
                    value: Expression::InfixOperation(
                        InfixOperationKind::Plus,
                        Box::new(Expression::Identifier(ident("x"))),
                        Box::new(Expression::PrefixOperation(
                            PrefixOperationKind::Minus,
                            Box::new(Expression::Identifier(ident("y"))),
                        )),
                    ),
                })],
            },
        };

        assert_eq!(function.to_string(), "fn(x, y) {\n  return (x + (-y));\n}");

        let hash = Expression::HashLiteral(vec![
            (
                Expression::StringLiteral("a".to_owned()),
                Expression::ArrayLiteral(vec![
                    Expression::IntegerLiteral(1),
                    Expression::BooleanLiteral(true),
                ]),
            ),
            (Expression::IntegerLiteral(2), Expression::IntegerLiteral(3)),
        ]);

        assert_eq!(hash.to_string(), "{\"a\": [1, true], 2: 3}");
    }
}
