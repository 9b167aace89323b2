//! Syntax tree produced by the parser.
//!
//! Every node owns its children outright. `Display` renders the canonical
//! source form (infix expressions fully parenthesised) and `token_literal`
//! returns the literal of the token that starts the node.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Let {
        name: String,
        value: Expr,
    },
    Return(Option<Expr>),
    Expr(Expr),
    Assign {
        name: String,
        value: Expr,
    },
    While {
        cond: Expr,
        body: Block,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    Ident(String),
    Prefix {
        op: PrefixOp,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Function {
        params: Vec<String>,
        body: Block,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
}

impl PrefixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "!",
        }
    }
}

impl InfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
        }
    }
}

impl Program {
    pub fn token_literal(&self) -> String {
        self.statements
            .first()
            .map(Stmt::token_literal)
            .unwrap_or_default()
    }
}

impl Stmt {
    pub fn token_literal(&self) -> String {
        match self {
            Stmt::Let { .. } => "let".to_string(),
            Stmt::Return(_) => "return".to_string(),
            Stmt::Expr(expr) => expr.token_literal(),
            Stmt::Assign { name, .. } => name.clone(),
            Stmt::While { .. } => "while".to_string(),
            Stmt::If { .. } => "if".to_string(),
            Stmt::Block(_) => "{".to_string(),
        }
    }
}

impl Expr {
    pub fn token_literal(&self) -> String {
        match self {
            Expr::Int(v) => v.to_string(),
            Expr::Str(s) => s.clone(),
            Expr::Bool(b) => b.to_string(),
            Expr::Ident(name) => name.clone(),
            Expr::Prefix { op, .. } => op.symbol().to_string(),
            Expr::Infix { op, .. } => op.symbol().to_string(),
            Expr::Call { .. } => "(".to_string(),
            Expr::Function { .. } => "fn".to_string(),
        }
    }

    /// Short human label used in compiler diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Int(_) => "integer literal",
            Expr::Str(_) => "string literal",
            Expr::Bool(_) => "boolean literal",
            Expr::Ident(_) => "identifier",
            Expr::Prefix { .. } => "prefix expression",
            Expr::Infix { .. } => "infix expression",
            Expr::Call { .. } => "call expression",
            Expr::Function { .. } => "function literal",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for s in &self.statements {
            write!(f, "{s} ")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {name} = {value};"),
            Stmt::Return(Some(value)) => write!(f, "return {value};"),
            Stmt::Return(None) => write!(f, "return;"),
            Stmt::Expr(expr) => write!(f, "{expr}"),
            Stmt::Assign { name, value } => write!(f, "{name} = {value};"),
            Stmt::While { cond, body } => write!(f, "while {cond} {body}"),
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                write!(f, "if {cond} {then_block}")?;
                if let Some(else_block) = else_block {
                    write!(f, " else {else_block}")?;
                }
                Ok(())
            }
            Stmt::Block(block) => write!(f, "{block}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(v) => write!(f, "{v}"),
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::Prefix { op, right } => write!(f, "({}{right})", op.symbol()),
            Expr::Infix { left, op, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_joined(f, args)?;
                write!(f, ")")
            }
            Expr::Function { params, body } => {
                write!(f, "fn(")?;
                write_joined(f, params)?;
                write!(f, ") {body}")
            }
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
