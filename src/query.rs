//! Submodule providing the textual query language: a whitespace-tokenized
//! parser for queries of the shape
//! `? Grade = g1 | SAT = s1 ! do Intelligence = i0 argmax ( Letter )`
//! and the executable plan dispatching to the inference kernel and the
//! intervention engine.

pub mod executer;
pub mod parser;

pub use executer::QueryExecuter;
pub use parser::Parser;
