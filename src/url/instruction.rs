//! Typed instructions lexed from request parameters
//!
//! Instructions are immutable and carry the name of the parameter they came
//! from so that later stages can attribute errors to it.

use std::fmt;

use serde::Serialize;

/// Filter comparison strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Equals
    Eq,
    /// Not equals
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Substring match
    Like,
    /// Case-insensitive substring match
    Ilike,
    /// Value in list
    In,
}

impl Strategy {
    pub const ALL: [Strategy; 9] = [
        Strategy::Eq,
        Strategy::Ne,
        Strategy::Gt,
        Strategy::Gte,
        Strategy::Lt,
        Strategy::Lte,
        Strategy::Like,
        Strategy::Ilike,
        Strategy::In,
    ];

    /// Get the strategy token
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Eq => "eq",
            Strategy::Ne => "ne",
            Strategy::Gt => "gt",
            Strategy::Gte => "gte",
            Strategy::Lt => "lt",
            Strategy::Lte => "lte",
            Strategy::Like => "like",
            Strategy::Ilike => "ilike",
            Strategy::In => "in",
        }
    }

    /// Look up a strategy by its token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == token)
    }

    /// Returns true for substring strategies
    pub fn is_substring(&self) -> bool {
        matches!(self, Strategy::Like | Strategy::Ilike)
    }

    /// Returns true for equality and its inverse
    pub fn is_equality(&self) -> bool {
        matches!(self, Strategy::Eq | Strategy::Ne)
    }
}

/// A strategy with its negation flag (`~gt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FilterStrategy {
    pub strategy: Strategy,
    pub negated: bool,
}

impl FilterStrategy {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            negated: false,
        }
    }

    pub fn negated(strategy: Strategy) -> Self {
        Self {
            strategy,
            negated: true,
        }
    }

    /// Parse a strategy token, accepting a leading `~`
    pub fn parse(token: &str) -> Option<Self> {
        match token.strip_prefix('~') {
            Some(rest) => Strategy::from_token(rest).map(Self::negated),
            None => Strategy::from_token(token).map(Self::new),
        }
    }
}

impl fmt::Display for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~")?;
        }
        write!(f, "{}", self.strategy.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "+",
            Direction::Descending => "-",
        }
    }
}

/// Recognized `page[...]` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStrategy {
    Limit,
    Offset,
    Size,
    Number,
}

impl PageStrategy {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "limit" => Some(PageStrategy::Limit),
            "offset" => Some(PageStrategy::Offset),
            "size" => Some(PageStrategy::Size),
            "number" => Some(PageStrategy::Number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageStrategy::Limit => "limit",
            PageStrategy::Offset => "offset",
            PageStrategy::Size => "size",
            PageStrategy::Number => "number",
        }
    }
}

/// Common view over instructions that walk a path
pub trait Instruction {
    /// Request parameter the instruction came from
    fn source(&self) -> &str;

    /// Ordered path segments
    fn path(&self) -> &[String];

    /// Dotted path as written by the client
    fn path_string(&self) -> String {
        self.path().join(".")
    }
}

/// `filter[<path>]=(~)?(<strategy>:)?<value>(,<value>)*`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub source: String,
    pub path: Vec<String>,
    /// Unset when the client gave none; defaulted from the attribute later
    pub strategy: Option<FilterStrategy>,
    pub values: Vec<String>,
}

/// One token of `sort=`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub source: String,
    pub path: Vec<String>,
    pub direction: Direction,
}

/// One token of `include=`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Include {
    pub source: String,
    pub path: Vec<String>,
}

/// `page[<strategy>]=<value>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginator {
    pub source: String,
    pub strategy: PageStrategy,
    /// Raw value; numeric validation happens during compilation
    pub value: String,
}

/// `fields[<type>]=<field>(,<field>)*`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    pub source: String,
    pub resource_type: String,
    pub fields: Vec<String>,
}

macro_rules! impl_instruction {
    ($($ty:ty),*) => {
        $(
            impl Instruction for $ty {
                fn source(&self) -> &str {
                    &self.source
                }

                fn path(&self) -> &[String] {
                    &self.path
                }
            }
        )*
    };
}

impl_instruction!(Filter, Sort, Include);

/// Every instruction lexed from one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Instructions {
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub includes: Vec<Include>,
    pub paginators: Vec<Paginator>,
    pub fieldsets: Vec<FieldSet>,
}

impl Instructions {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.sorts.is_empty()
            && self.includes.is_empty()
            && self.paginators.is_empty()
            && self.fieldsets.is_empty()
    }
}
