pub mod ast;
pub mod builtins;
pub mod bytecode;
pub mod compiler;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod reference;
pub mod token;
pub mod vm;
