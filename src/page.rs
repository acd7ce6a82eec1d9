//! Filtering, sorting and pagination for device listings.

use crate::model::{Device, DeviceState};
use std::cmp::Ordering;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Exact-match filters; both may be combined.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        self.brand.as_deref().map_or(true, |b| device.brand == b)
            && self.state.map_or(true, |s| device.state == s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Name,
    Brand,
    State,
    CreationTime,
    LastModified,
}

impl SortField {
    /// ORDER BY expression; the only identifiers that reach it. Text columns sort by
    /// byte value so PostgreSQL agrees with [`Sort::compare`] whatever the database collation.
    pub fn order_by(&self) -> &'static str {
        match self {
            SortField::Name => "name COLLATE \"C\"",
            SortField::Brand => "brand COLLATE \"C\"",
            SortField::State => "state COLLATE \"C\"",
            SortField::CreationTime => "creation_time",
            SortField::LastModified => "last_modified",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "brand" => Ok(SortField::Brand),
            "state" => Ok(SortField::State),
            "creation_time" => Ok(SortField::CreationTime),
            "last_modified" => Ok(SortField::LastModified),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Default for Sort {
    fn default() -> Self {
        Sort {
            field: SortField::CreationTime,
            direction: Direction::Asc,
        }
    }
}

impl Sort {
    /// Parse `field` or `field,asc|desc` (direction is case-insensitive).
    pub fn parse(s: &str) -> Result<Self, String> {
        let mut parts = s.splitn(2, ',');
        let field = parts.next().unwrap_or("").trim().parse::<SortField>()?;
        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => Direction::Asc,
            Some(d) if d == "asc" => Direction::Asc,
            Some(d) if d == "desc" => Direction::Desc,
            Some(d) => return Err(format!("unknown sort direction: {}", d)),
        };
        Ok(Sort { field, direction })
    }

    /// Ordering matching the SQL `ORDER BY <field> <dir>, id <dir>`.
    pub fn compare(&self, a: &Device, b: &Device) -> Ordering {
        let primary = match self.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Brand => a.brand.cmp(&b.brand),
            SortField::State => a.state.as_str().cmp(b.state.as_str()),
            SortField::CreationTime => a.creation_time.cmp(&b.creation_time),
            SortField::LastModified => a.last_modified.cmp(&b.last_modified),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));
        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None, Sort::default())
    }
}

impl PageRequest {
    /// Size defaults to 100 and is clamped to 1..=1000.
    pub fn new(page: Option<u32>, size: Option<u32>, sort: Sort) -> Self {
        PageRequest {
            page: page.unwrap_or(0),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Page {
            items,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
