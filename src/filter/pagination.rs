use serde::{Deserialize, Serialize};

use super::error::FilterError;

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_OFFSET: u32 = 0;

/// Raw `limit`/`offset` query parameters.
///
/// Kept as strings so malformed numbers surface as a [`FilterError`] rather than an extractor
/// rejection with a different response shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Validated query window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl Page {
    /// `limit` must be a positive integer and `offset` a non-negative one. Out-of-range values
    /// are rejected, never clamped.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, FilterError> {
        Self::with_default_limit(limit, offset, DEFAULT_LIMIT)
    }

    pub fn with_default_limit(
        limit: Option<i64>,
        offset: Option<i64>,
        default_limit: u32,
    ) -> Result<Self, FilterError> {
        let limit = match limit {
            None => default_limit,
            Some(l) if l < 1 => {
                return Err(FilterError::InvalidLimit("limit must be a positive integer".to_string()))
            }
            Some(l) => u32::try_from(l)
                .map_err(|_| FilterError::InvalidLimit(format!("limit {} is out of range", l)))?,
        };

        let offset = match offset {
            None => DEFAULT_OFFSET,
            Some(o) if o < 0 => {
                return Err(FilterError::InvalidOffset("offset must not be less than 0".to_string()))
            }
            Some(o) => u32::try_from(o)
                .map_err(|_| FilterError::InvalidOffset(format!("offset {} is out of range", o)))?,
        };

        Ok(Self { limit, offset })
    }

    /// Apply this window to an in-memory sequence
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl PageQuery {
    pub fn into_page(self, default_limit: u32) -> Result<Page, FilterError> {
        let limit = parse_integer(self.limit.as_deref())
            .map_err(|raw| FilterError::InvalidLimit(format!("limit must be an integer, got '{}'", raw)))?;
        let offset = parse_integer(self.offset.as_deref())
            .map_err(|raw| FilterError::InvalidOffset(format!("offset must be an integer, got '{}'", raw)))?;
        Page::with_default_limit(limit, offset, default_limit)
    }
}

fn parse_integer(raw: Option<&str>) -> Result<Option<i64>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(|_| s.to_string()),
    }
}
