use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Print(Vec<Expression>),
    Assign(AssignStatement),
    Expression(Expression),
    With(WithStatement),
}

#[derive(Debug, PartialEq, Clone)]
pub struct AssignStatement {
    pub identifier: Identifier,
    pub value: Expression,
}

/// `with context [as binding]: body`. The body runs exactly once and the
/// binding is removed from the environment afterwards.
#[derive(Debug, PartialEq, Clone)]
pub struct WithStatement {
    pub context: Expression,
    pub binding: Option<Identifier>,
    pub body: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(LiteralKind, Rc<str>),
    /// Raw template text, rendered against the environment at evaluation time.
    Template(Rc<str>),
    Identifier(Identifier),
    Negate(Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    MethodCall {
        receiver: Box<Expression>,
        method: Identifier,
        arguments: Vec<Expression>,
    },
    List(Vec<Expression>),
    Index {
        collection: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
    None,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
}

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Identifier {
    pub name: Rc<str>,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier { name: name.into() }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

fn write_list<T: Display>(f: &mut std::fmt::Formatter<'_>, items: &[T]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
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
            Literal(LiteralKind::String, val) => write!(f, "{:?}", val),
            Literal(_, val) => write!(f, "{}", val),
            Template(val) => write!(f, "f\"{}\"", val),
            Identifier(ident) => write!(f, "{}", ident.name),
            Negate(expr) => write!(f, "(-{})", expr),
            Binary(op, left, right) => write!(f, "({} {} {})", left, op.to_str(), right),
            Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            MethodCall {
                receiver,
                method,
                arguments,
            } => {
                write!(f, "{}.{}(", receiver, method.name)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            List(elements) => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Index { collection, index } => write!(f, "({}[{}])", collection, index),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Print(expressions) => {
                write!(f, "print(")?;
                write_list(f, expressions)?;
                write!(f, ")")
            }
            Statement::Assign(statement) => {
                write!(f, "{} = {}", statement.identifier.name, statement.value)
            }
            Statement::Expression(expression) => write!(f, "{}", expression),
            Statement::With(statement) => {
                write!(f, "with {}", statement.context)?;
                if let Some(binding) = &statement.binding {
                    write!(f, " as {}", binding.name)?;
                }
                write!(f, ":")?;
                for (i, inner) in statement.body.iter().enumerate() {
                    let separator = if i == 0 { " " } else { "; " };
                    write!(f, "{}{}", separator, inner)?;
                }
                Ok(())
            }
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

impl BinaryOperator {
    pub fn to_str(&self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            Equal => "==",
            NotEqual => "!=",
            LessThan => "<",
            GreaterThan => ">",
        }
    }
}
