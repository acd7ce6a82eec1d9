//! Standard response envelope helpers.

use crate::page::Page;
use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize, ToSchema)]
pub struct SuccessPage<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::CREATED, Json(SuccessOne { data }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (StatusCode::OK, Json(SuccessOne { data }))
}

pub fn success_page<T: Serialize>(page: Page<T>) -> (StatusCode, Json<SuccessPage<T>>) {
    let meta = PageMeta {
        page: page.page,
        size: page.size,
        total_elements: page.total_elements,
        total_pages: page.total_pages(),
    };
    (
        StatusCode::OK,
        Json(SuccessPage {
            data: page.items,
            meta,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageRequest, Sort};

    #[test]
    fn page_envelope_carries_totals() {
        let request = PageRequest::new(Some(1), Some(2), Sort::default());
        let (status, Json(body)) = success_page(Page::new(vec!["c"], &request, 3));
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": ["c"],
                "meta": {"page": 1, "size": 2, "total_elements": 3, "total_pages": 2}
            })
        );
    }
}
