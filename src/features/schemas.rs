use serde::Serialize;
use tracing::warn;

/// Per-endpoint page size policy.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PageLimits {
    pub default_limit: i64,
    pub max_limit: i64,
}

pub const LIST_LIMITS: PageLimits = PageLimits {
    default_limit: 12,
    max_limit: 50,
};

pub const NEARBY_LIMITS: PageLimits = PageLimits {
    default_limit: 12,
    max_limit: 50,
};

pub const BOUNDS_LIMITS: PageLimits = PageLimits {
    default_limit: 50,
    max_limit: 100,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Coerces raw `page`/`limit` values. Unparsable values fall back to the
    /// defaults, `page` is floored at 1 and `limit` is clamped to
    /// `1..=max_limit`.
    pub fn parse(page: Option<&str>, limit: Option<&str>, limits: PageLimits) -> Self {
        let page = parse_or(page, "page", 1).max(1);
        let limit = parse_or(limit, "limit", limits.default_limit).clamp(1, limits.max_limit);

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_or(raw: Option<&str>, name: &str, default: i64) -> i64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            warn!("ignoring non-numeric {name}: {s:?}");
            default
        }),
    }
}

/// Total count, keyed `totalItems` on the plain list and `totalProperties` on
/// the geo endpoints.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Total {
    #[serde(rename = "totalItems")]
    Items(i64),
    #[serde(rename = "totalProperties")]
    Properties(i64),
}

impl Total {
    pub fn count(&self) -> i64 {
        match self {
            Self::Items(n) | Self::Properties(n) => *n,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOut {
    pub current_page: i64,
    pub total_pages: i64,
    #[serde(flatten)]
    pub total: Total,
    pub items_per_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationOut {
    pub fn new(pagination: &Pagination, total: Total) -> Self {
        let count = total.count();
        let total_pages = (count + pagination.limit - 1) / pagination.limit;

        Self {
            current_page: pagination.page,
            total_pages,
            total,
            items_per_page: pagination.limit,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}
