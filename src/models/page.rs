use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort on a whitelisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub direction: Direction,
}

/// Validated paging request handed to the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<SortOrder>,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Raw `?page=&size=&sort=property,direction` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

impl PageParams {
    /// `sortable` maps wire property names onto column names.
    pub fn resolve(
        &self,
        paging: &PagingConfig,
        sortable: &[(&str, &'static str)],
    ) -> Result<PageRequest, AppError> {
        let size = self.size.unwrap_or(paging.default_size);
        if size == 0 || size > paging.max_size {
            return Err(AppError::invalid_argument(format!(
                "Page size must be between 1 and {}",
                paging.max_size
            )));
        }

        let page = self.page.unwrap_or(0);
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_sort(raw, sortable)?),
        };

        Ok(PageRequest { page, size, sort })
    }
}

fn parse_sort(raw: &str, sortable: &[(&str, &'static str)]) -> Result<SortOrder, AppError> {
    let mut parts = raw.splitn(2, ',').map(str::trim);
    let property = parts.next().unwrap_or_default();
    let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("asc") => Direction::Asc,
        Some("desc") => Direction::Desc,
        Some(other) => {
            return Err(AppError::invalid_argument(format!(
                "Unknown sort direction '{other}'"
            )))
        }
    };

    let column = sortable
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, column)| *column)
        .ok_or_else(|| AppError::invalid_argument(format!("Cannot sort by '{property}'")))?;

    Ok(SortOrder { column, direction })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
