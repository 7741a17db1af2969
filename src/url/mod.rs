//! URL instruction parsing
//!
//! Turns request parameters into typed instructions:
//!
//! ```text
//! filter[<path>]=(~)?(<strategy>:)?<value>(,<value>)*
//! sort=(+|-)?<path>(,(+|-)?<path>)*
//! include=<path>(,<path>)*
//! page[limit|offset|size|number]=<integer>
//! fields[<type>]=<field>(,<field>)*
//! ```
//!
//! Commas inside filter values cannot be escaped.

mod instruction;
mod parser;
mod query_string;

pub use instruction::{
    Direction, FieldSet, Filter, FilterStrategy, Include, Instruction, Instructions, PageStrategy,
    Paginator, Sort, Strategy,
};
pub use parser::parse_parameters;
pub use query_string::{encode_query_string, parse_query_string};
