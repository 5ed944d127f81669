//! Contract schemas for JSON payloads: matching, example-driven test
//! generation and backward-compatibility checking between versions.
pub mod value;
pub mod result;
pub mod error;
pub mod row;
pub mod keys;
pub mod resolver;
pub mod pattern;
pub mod combinator;
pub mod compatibility;
pub mod execution;
pub mod contract;
pub mod config;
pub mod path_de;
pub mod cli;

pub use error::{ContractError, ContractResult, ErrorKind};
pub use pattern::{Pattern, TabularPattern, TypeStack};
pub use resolver::Resolver;
pub use result::{Failure, MatchResult};
pub use row::Row;
