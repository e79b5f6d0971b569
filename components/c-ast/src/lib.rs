//! A small syntax tree for C declarations, and the builders and writer
//! used to turn it into header text.

pub mod ast;
mod gen;
mod mutate;
mod write;
mod writer;

pub use crate::gen::*;
pub use crate::writer::Writer;
