//! SQL for the `devices` table. Identifiers come from this module only; values are parameters.

use super::params::BindValue;
use crate::page::{DeviceFilter, PageRequest};

pub const TABLE: &str = "devices";
pub const COLUMNS: &str = "id, name, brand, state, creation_time, last_modified";

pub const SELECT_BY_ID: &str =
    "SELECT id, name, brand, state, creation_time, last_modified FROM devices WHERE id = $1";

/// Row lock for read-modify-write inside a transaction.
pub const SELECT_BY_ID_FOR_UPDATE: &str =
    "SELECT id, name, brand, state, creation_time, last_modified FROM devices WHERE id = $1 FOR UPDATE";

pub const INSERT: &str = "INSERT INTO devices (id, name, brand, state, creation_time, last_modified) \
     VALUES ($1, $2, $3, $4, $5, $6)";

/// `creation_time` is never part of an update.
pub const UPDATE: &str =
    "UPDATE devices SET name = $2, brand = $3, state = $4, last_modified = $5 WHERE id = $1";

pub const DELETE: &str = "DELETE FROM devices WHERE id = $1";

/// Deleted ids are kept so they are never handed out again.
pub const INSERT_TOMBSTONE: &str =
    "INSERT INTO deleted_devices (id, deleted_at) VALUES ($1, date_trunc('second', NOW() AT TIME ZONE 'UTC'))";

pub const TOMBSTONE_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM deleted_devices WHERE id = $1)";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: impl Into<BindValue>) -> usize {
        self.params.push(v.into());
        self.params.len()
    }
}

fn push_where(q: &mut QueryBuf, filter: &DeviceFilter) {
    let mut conditions: Vec<String> = Vec::new();
    if let Some(brand) = &filter.brand {
        let n = q.push_param(brand.as_str());
        conditions.push(format!("brand = ${}", n));
    }
    if let Some(state) = filter.state {
        let n = q.push_param(state);
        conditions.push(format!("state = ${}", n));
    }
    if !conditions.is_empty() {
        q.sql.push_str(" WHERE ");
        q.sql.push_str(&conditions.join(" AND "));
    }
}

/// One page of devices. The sort column is tie-broken by `id` in the same direction so
/// pages never overlap.
pub fn select_page(filter: &DeviceFilter, page: &PageRequest) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT {} FROM {}", COLUMNS, TABLE);
    push_where(&mut q, filter);
    let dir = page.sort.direction.keyword();
    q.sql
        .push_str(&format!(" ORDER BY {} {}, id {}", page.sort.field.order_by(), dir, dir));
    let limit = q.push_param(i64::from(page.size));
    let offset = q.push_param(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    q.sql.push_str(&format!(" LIMIT ${} OFFSET ${}", limit, offset));
    q
}

pub fn count(filter: &DeviceFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", TABLE);
    push_where(&mut q, filter);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceState;
    use crate::page::{Direction, Sort, SortField};

    #[test]
    fn unfiltered_page_uses_default_order() {
        let q = select_page(&DeviceFilter::default(), &PageRequest::default());
        assert_eq!(
            q.sql,
            "SELECT id, name, brand, state, creation_time, last_modified FROM devices \
             ORDER BY creation_time ASC, id ASC LIMIT $1 OFFSET $2"
        );
        assert_eq!(q.params, vec![BindValue::BigInt(100), BindValue::BigInt(0)]);
    }

    #[test]
    fn filters_are_numbered_before_paging() {
        let filter = DeviceFilter {
            brand: Some("acme".into()),
            state: Some(DeviceState::InUse),
        };
        let sort = Sort {
            field: SortField::Name,
            direction: Direction::Desc,
        };
        let q = select_page(&filter, &PageRequest::new(Some(2), Some(10), sort));
        assert!(q.sql.contains(" WHERE brand = $1 AND state = $2 "));
        assert!(q.sql.ends_with("ORDER BY name COLLATE \"C\" DESC, id DESC LIMIT $3 OFFSET $4"));
        assert_eq!(
            q.params,
            vec![
                BindValue::Text("acme".into()),
                BindValue::Text("IN_USE".into()),
                BindValue::BigInt(10),
                BindValue::BigInt(20),
            ]
        );
    }

    #[test]
    fn count_shares_the_filter() {
        let filter = DeviceFilter {
            brand: None,
            state: Some(DeviceState::Inactive),
        };
        let q = count(&filter);
        assert_eq!(q.sql, "SELECT COUNT(*) FROM devices WHERE state = $1");
        assert_eq!(q.params.len(), 1);
    }
}
