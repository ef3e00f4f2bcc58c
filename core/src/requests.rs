//! Stateless request builders for the catalog endpoints.
//!
//! Every route is relative to the transport's base address and uses the
//! lowercase form `{entity}/{action}`. Query values are interpolated without
//! escaping.

use serde::Serialize;
use uuid::Uuid;

use crate::bridge;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::models::{EntityKind, PageQuery};

pub fn admin_info() -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, "admin/info")
}

pub fn admin_seed(count: usize) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, "admin/seed").query("count", count)
}

pub fn admin_remove_seed(seeded: bool) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, "admin/removeseed").query("seeded", seeded)
}

pub fn read_page(entity: EntityKind, query: &PageQuery) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("{}/read", entity.segment()))
        .query("seeded", query.seeded)
        .query("flat", query.flat)
        .query("filter", &query.filter)
        .query("pagenr", query.page_nr)
        .query("pagesize", query.page_size)
}

pub fn read_item(entity: EntityKind, id: Uuid, flat: bool) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("{}/readitem", entity.segment()))
        .query("id", id)
        .query("flat", flat)
}

pub fn create_item<B: Serialize>(entity: EntityKind, item: &B) -> Result<HttpRequest, ApiError> {
    let body = encode(item)?;
    let path = format!("{}/createitem", entity.segment());
    Ok(HttpRequest::new(HttpMethod::Post, path).json_body(body))
}

pub fn update_item<B: Serialize>(
    entity: EntityKind,
    id: Uuid,
    item: &B,
) -> Result<HttpRequest, ApiError> {
    let body = encode(item)?;
    let path = format!("{}/updateitem/{id}", entity.segment());
    Ok(HttpRequest::new(HttpMethod::Put, path).json_body(body))
}

pub fn delete_item(entity: EntityKind, id: Uuid) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("{}/deleteitem/{id}", entity.segment()))
}

fn encode<B: Serialize>(item: &B) -> Result<String, ApiError> {
    bridge::to_string(item).map_err(|e| ApiError::Serialization(e.to_string()))
}
