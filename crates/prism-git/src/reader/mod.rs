//! Configuration file reading and parsing.
//!
//! Files follow Spring Cloud Config naming conventions.

mod format;
mod parser;
mod resolver;

pub use format::ConfigFormat;
pub use parser::ConfigParser;
pub use resolver::{ConfigFileResolver, FileTree};
