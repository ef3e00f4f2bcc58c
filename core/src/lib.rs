//! Blocking client for the music catalog web API.
//!
//! # Overview
//! Calls the catalog's admin and CRUD endpoints for music groups, albums and
//! artists, and decodes responses into entities exposed only through
//! capability traits (`MusicGroupView`, `AlbumView`, `ArtistView`).
//!
//! # Design
//! - `bridge` maps each capability trait to the one concrete record decoded
//!   in its place, recursively, via `Entity<dyn Trait>`.
//! - `requests` builds plain-data `HttpRequest` values; `Transport` is the
//!   only I/O seam, with `UreqTransport` as the network implementation.
//! - `MusicClient` implements the `MusicService` operations: build, send,
//!   check status, decode. Unimplemented operations fail with
//!   `ApiError::Unsupported` without sending anything.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod requests;
pub mod transport;

pub use bridge::{BridgeError, Entity, TypePair};
pub use client::{MusicClient, MusicService};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use models::{
    Album, AlbumCuDto, AlbumEntity, AlbumView, Artist, ArtistCuDto, ArtistEntity, ArtistView,
    CatalogDbInfo, CatalogInfo, EntityKind, MusicGenre, MusicGroup, MusicGroupCuDto,
    MusicGroupEntity, MusicGroupView, Page, PageQuery,
};
pub use transport::{Transport, UreqTransport};
