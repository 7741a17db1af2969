//! # Query Parameter Parser
//!
//! Lexes request parameters into typed instructions. Parsing never fails:
//! unrecognized parameters are ignored and every semantic check is left to
//! the resolution stages so that all parameters can be reported at once.

use super::instruction::{
    Direction, FieldSet, Filter, FilterStrategy, Include, Instructions, PageStrategy, Paginator,
    Sort,
};

/// Separates the strategy token from the value list
pub const STRATEGY_PARTITION: char = ':';

/// Separates values, sort tokens and include tokens
pub const VALUE_PARTITION: char = ',';

/// Separates path segments
pub const PATH_PARTITION: char = '.';

/// Lex an ordered sequence of parameter pairs into instructions
pub fn parse_parameters<I, K, V>(params: I) -> Instructions
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut result = Instructions::default();

    for (key, value) in params {
        let key = key.as_ref();
        let value = value.as_ref();

        match key {
            "sort" => result.sorts.extend(parse_sorts(value)),
            "include" => result.includes.extend(parse_includes(value)),
            _ => {
                if let Some(path) = namespaced(key, "filter") {
                    if !path.is_empty() {
                        result.filters.push(parse_filter(key, path, value));
                    }
                } else if let Some(page_key) = namespaced(key, "page") {
                    // Unknown page keys (e.g. cursor) are ignored
                    if let Some(strategy) = PageStrategy::from_key(page_key) {
                        result.paginators.push(Paginator {
                            source: key.to_string(),
                            strategy,
                            value: value.to_string(),
                        });
                    }
                } else if let Some(resource_type) = namespaced(key, "fields") {
                    if !resource_type.is_empty() {
                        result.fieldsets.push(parse_fieldset(key, resource_type, value));
                    }
                }
            }
        }
    }

    result
}

/// Returns the bracketed part of `<namespace>[<inner>]`
fn namespaced<'a>(key: &'a str, namespace: &str) -> Option<&'a str> {
    key.strip_prefix(namespace)?
        .strip_prefix('[')?
        .strip_suffix(']')
}

fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_PARTITION).map(str::to_string).collect()
}

/// Parse a filter expression from `filter[path]=value`
fn parse_filter(source: &str, path: &str, value: &str) -> Filter {
    let (strategy, data) = split_strategy(value);

    Filter {
        source: source.to_string(),
        path: split_path(path),
        strategy,
        values: data.split(VALUE_PARTITION).map(str::to_string).collect(),
    }
}

/// Split an optional strategy token from the value list.
///
/// The token is only honored when it names a known strategy; otherwise the
/// whole string, colon included, is data.
fn split_strategy(value: &str) -> (Option<FilterStrategy>, &str) {
    if let Some((token, rest)) = value.split_once(STRATEGY_PARTITION) {
        if let Some(strategy) = FilterStrategy::parse(token) {
            return (Some(strategy), rest);
        }
    }
    (None, value)
}

/// Parse sort parameter (comma-separated, optional +/- prefix)
fn parse_sorts(value: &str) -> Vec<Sort> {
    value
        .split(VALUE_PARTITION)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let (direction, path) = if let Some(rest) = token.strip_prefix('-') {
                (Direction::Descending, rest)
            } else if let Some(rest) = token.strip_prefix('+') {
                (Direction::Ascending, rest)
            } else {
                (Direction::Ascending, token)
            };

            Sort {
                source: "sort".to_string(),
                path: split_path(path),
                direction,
            }
        })
        .collect()
}

/// Parse include parameter (comma-separated relationship paths)
fn parse_includes(value: &str) -> Vec<Include> {
    value
        .split(VALUE_PARTITION)
        .filter(|token| !token.is_empty())
        .map(|token| Include {
            source: "include".to_string(),
            path: split_path(token),
        })
        .collect()
}

/// Parse sparse fieldset parameter
fn parse_fieldset(source: &str, resource_type: &str, value: &str) -> FieldSet {
    FieldSet {
        source: source.to_string(),
        resource_type: resource_type.to_string(),
        fields: value
            .split(VALUE_PARTITION)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
    }
}
