//! Pagination links
//!
//! Links repeat the client's parameters in order, with the `page[...]`
//! parameters replaced and emitted in the strategy the client used.

use serde::Serialize;

use crate::compiler::{Pagination, PaginationMode};
use crate::url::{encode_query_string, PageStrategy};

/// Top-level `links` member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl Links {
    /// Links for a window over `total` matching rows under `base`
    pub fn paginate(
        base: &str,
        parameters: &[(String, String)],
        pagination: &Pagination,
        total: u64,
    ) -> Self {
        let kept: Vec<(String, String)> = parameters
            .iter()
            .filter(|(key, _)| !is_page_key(key))
            .cloned()
            .collect();
        let limit = pagination.window.limit;

        match pagination.mode {
            PaginationMode::Offset => {
                let offset = pagination.window.offset;
                let last = if total == 0 || limit == 0 {
                    0
                } else {
                    (total - 1) / limit * limit
                };
                let link = |offset: u64| {
                    url(
                        base,
                        &kept,
                        [
                            (PageStrategy::Limit, limit),
                            (PageStrategy::Offset, offset),
                        ],
                    )
                };

                Self {
                    self_link: link(offset),
                    first: link(0),
                    last: link(last),
                    next: offset
                        .checked_add(limit)
                        .filter(|next| limit > 0 && *next < total)
                        .map(&link),
                    prev: (limit > 0 && offset > 0).then(|| link(offset.saturating_sub(limit))),
                }
            }
            PaginationMode::Page => {
                let number = pagination.page_number();
                let last = if total == 0 || limit == 0 {
                    1
                } else {
                    (total - 1) / limit + 1
                };
                let link = |number: u64| {
                    url(
                        base,
                        &kept,
                        [(PageStrategy::Number, number), (PageStrategy::Size, limit)],
                    )
                };

                Self {
                    self_link: link(number),
                    first: link(1),
                    last: link(last),
                    next: number
                        .checked_add(1)
                        .filter(|next| *next <= last)
                        .map(&link),
                    prev: (number > 1).then(|| link(number - 1)),
                }
            }
        }
    }
}

fn is_page_key(key: &str) -> bool {
    key.strip_prefix("page[")
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some()
}

fn url(base: &str, kept: &[(String, String)], page: [(PageStrategy, u64); 2]) -> String {
    let mut pairs: Vec<(String, String)> = kept.to_vec();
    pairs.extend(
        page.iter()
            .map(|(strategy, n)| (format!("page[{}]", strategy.as_str()), n.to_string())),
    );
    format!("{}?{}", base, encode_query_string(&pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Window;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn offset(limit: u64, offset: u64) -> Pagination {
        Pagination {
            mode: PaginationMode::Offset,
            window: Window { limit, offset },
        }
    }

    #[test]
    fn test_offset_links() {
        let links = Links::paginate(
            "/people",
            &params(&[("sort", "-age"), ("page[offset]", "10"), ("page[limit]", "10")]),
            &offset(10, 10),
            25,
        );

        assert_eq!(links.self_link, "/people?sort=-age&page%5Blimit%5D=10&page%5Boffset%5D=10");
        assert_eq!(links.first, "/people?sort=-age&page%5Blimit%5D=10&page%5Boffset%5D=0");
        assert_eq!(links.last, "/people?sort=-age&page%5Blimit%5D=10&page%5Boffset%5D=20");
        assert!(links.next.unwrap().ends_with("page%5Boffset%5D=20"));
        assert!(links.prev.unwrap().ends_with("page%5Boffset%5D=0"));
    }

    #[test]
    fn test_page_links() {
        let pagination = Pagination {
            mode: PaginationMode::Page,
            window: Window { limit: 10, offset: 0 },
        };
        let links = Links::paginate("/people", &[], &pagination, 25);

        assert_eq!(links.self_link, "/people?page%5Bnumber%5D=1&page%5Bsize%5D=10");
        assert!(links.last.contains("page%5Bnumber%5D=3"));
        assert!(links.next.unwrap().contains("page%5Bnumber%5D=2"));
        assert!(links.prev.is_none());
    }

    #[test]
    fn test_empty_result_links() {
        let links = Links::paginate("/people", &[], &offset(50, 0), 0);
        assert_eq!(links.first, links.last);
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
    }

    #[test]
    fn test_largest_limit_has_no_next() {
        let links = Links::paginate("/people", &[], &offset(u64::MAX, 1), 4);
        assert!(links.next.is_none());
        assert!(links.last.ends_with("page%5Boffset%5D=0"));
        assert!(links.prev.unwrap().ends_with("page%5Boffset%5D=0"));

        let pagination = Pagination {
            mode: PaginationMode::Page,
            window: Window { limit: u64::MAX, offset: 0 },
        };
        let links = Links::paginate("/people", &[], &pagination, 4);
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
        assert!(links.last.contains("page%5Bnumber%5D=1"));
    }

    #[test]
    fn test_zero_limit_has_no_neighbours() {
        let links = Links::paginate("/people", &[], &offset(0, 1), 4);
        assert!(links.next.is_none());
        assert!(links.prev.is_none());
    }
}
