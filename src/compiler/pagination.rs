//! Result window from `page[...]` parameters
//!
//! Two mutually exclusive strategies:
//! - offset: `page[limit]`, `page[offset]`
//! - page number: `page[size]`, `page[number]`, with
//!   `offset = (number - 1) * size`
//!
//! Absent keys take their configured defaults. When a key repeats, the last
//! occurrence wins. Zero limits, sizes and page numbers are rejected.

use serde::Serialize;

use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::url::{PageStrategy, Paginator};

/// Which strategy the client used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    Offset,
    Page,
}

/// Rows kept after ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub mode: PaginationMode,
    pub window: Window,
}

impl Pagination {
    /// Offset pagination with the configured defaults
    pub fn defaults(config: &QueryConfig) -> Self {
        Self {
            mode: PaginationMode::Offset,
            window: Window {
                limit: config.default_limit,
                offset: config.default_offset,
            },
        }
    }

    /// 1-based page the window starts on
    pub fn page_number(&self) -> u64 {
        if self.window.limit == 0 {
            1
        } else {
            (self.window.offset / self.window.limit).saturating_add(1)
        }
    }
}

/// Build the window, reporting every bad paginator
pub fn paginate(
    paginators: &[Paginator],
    config: &QueryConfig,
) -> Result<Pagination, Vec<QueryError>> {
    let mut errors = Vec::new();
    let mut parsed: Vec<(&Paginator, u64)> = Vec::with_capacity(paginators.len());

    for paginator in paginators {
        match paginator.value.trim().parse::<u64>() {
            Ok(n) => parsed.push((paginator, n)),
            Err(_) => errors.push(QueryError::invalid_pagination_value(
                paginator.source.as_str(),
                &paginator.value,
            )),
        }
    }

    let last = |strategy: PageStrategy| {
        parsed
            .iter()
            .rev()
            .find(|(p, _)| p.strategy == strategy)
            .copied()
    };
    let (limit, offset) = (last(PageStrategy::Limit), last(PageStrategy::Offset));
    let (size, number) = (last(PageStrategy::Size), last(PageStrategy::Number));

    let uses_offset = paginators
        .iter()
        .any(|p| matches!(p.strategy, PageStrategy::Limit | PageStrategy::Offset));
    let page_source = paginators
        .iter()
        .find(|p| matches!(p.strategy, PageStrategy::Size | PageStrategy::Number));

    if let (true, Some(p)) = (uses_offset, page_source) {
        errors.push(QueryError::conflicting_pagination(p.source.as_str()));
    }

    for (p, n) in [limit, size, number].into_iter().flatten() {
        if n == 0 {
            errors.push(QueryError::invalid_pagination_value(p.source.as_str(), &p.value));
        }
    }

    if let Some(max) = config.max_page_size {
        for (p, n) in [limit, size].into_iter().flatten() {
            if n > max {
                errors.push(QueryError::page_size_exceeded(p.source.as_str(), n, max));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let pagination = if page_source.is_some() {
        let size = size.map_or(config.default_limit, |(_, n)| n);
        let number = number.map_or(1, |(_, n)| n);
        Pagination {
            mode: PaginationMode::Page,
            window: Window {
                limit: size,
                offset: (number - 1).saturating_mul(size),
            },
        }
    } else {
        Pagination {
            mode: PaginationMode::Offset,
            window: Window {
                limit: limit.map_or(config.default_limit, |(_, n)| n),
                offset: offset.map_or(config.default_offset, |(_, n)| n),
            },
        }
    };

    Ok(pagination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorCode;
    use crate::url::parse_parameters;

    fn run(pairs: &[(&str, &str)], config: &QueryConfig) -> Result<Pagination, Vec<QueryError>> {
        let instructions = parse_parameters(pairs.iter().copied());
        paginate(&instructions.paginators, config)
    }

    #[test]
    fn test_defaults_when_absent() {
        let pagination = run(&[], &QueryConfig::default()).unwrap();
        assert_eq!(pagination.mode, PaginationMode::Offset);
        assert_eq!(pagination.window, Window { limit: 50, offset: 0 });
    }

    #[test]
    fn test_offset_strategy() {
        let pagination = run(&[("page[limit]", "10"), ("page[offset]", "20")], &QueryConfig::default()).unwrap();
        assert_eq!(pagination.window, Window { limit: 10, offset: 20 });
        assert_eq!(pagination.page_number(), 3);

        let pagination = run(&[("page[limit]", "1"), ("page[offset]", "18446744073709551615")], &QueryConfig::default()).unwrap();
        assert_eq!(pagination.page_number(), u64::MAX);
    }

    #[test]
    fn test_page_strategy() {
        let pagination = run(&[("page[number]", "3"), ("page[size]", "10")], &QueryConfig::default()).unwrap();
        assert_eq!(pagination.mode, PaginationMode::Page);
        assert_eq!(pagination.window, Window { limit: 10, offset: 20 });

        let pagination = run(&[("page[number]", "2")], &QueryConfig::default()).unwrap();
        assert_eq!(pagination.window, Window { limit: 50, offset: 50 });
    }

    #[test]
    fn test_non_numeric_rejected() {
        let errors = run(&[("page[limit]", "abc"), ("page[offset]", "-1")], &QueryConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.code() == QueryErrorCode::InvalidPaginationValue));
        assert_eq!(errors[0].source(), Some("page[limit]"));
    }

    #[test]
    fn test_page_number_zero_rejected() {
        let errors = run(&[("page[number]", "0")], &QueryConfig::default()).unwrap_err();
        assert_eq!(errors[0].code(), QueryErrorCode::InvalidPaginationValue);
        assert_eq!(errors[0].source(), Some("page[number]"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let errors = run(&[("page[limit]", "0"), ("page[offset]", "1")], &QueryConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), QueryErrorCode::InvalidPaginationValue);
        assert_eq!(errors[0].source(), Some("page[limit]"));

        let errors = run(&[("page[size]", "0")], &QueryConfig::default()).unwrap_err();
        assert_eq!(errors[0].source(), Some("page[size]"));
    }

    #[test]
    fn test_mixed_strategies_conflict() {
        let errors = run(&[("page[limit]", "10"), ("page[number]", "2")], &QueryConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), QueryErrorCode::ConflictingPagination);
    }

    #[test]
    fn test_max_page_size() {
        let config = QueryConfig {
            max_page_size: Some(100),
            ..QueryConfig::default()
        };
        let errors = run(&[("page[limit]", "500")], &config).unwrap_err();
        assert_eq!(errors[0].code(), QueryErrorCode::InvalidPaginationValue);
        assert!(run(&[("page[limit]", "100")], &config).is_ok());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let pagination = run(&[("page[limit]", "5"), ("page[limit]", "7")], &QueryConfig::default()).unwrap();
        assert_eq!(pagination.window.limit, 7);
    }
}
