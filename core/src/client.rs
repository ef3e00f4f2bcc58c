//! Catalog operations over a [`Transport`].
//!
//! # Design
//! `MusicClient` holds only its transport. Each operation builds a request
//! with [`crate::requests`], sends it, checks the status and decodes the body
//! through [`crate::bridge`]. Operations the client does not implement return
//! [`ApiError::Unsupported`] before touching the transport.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::bridge;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::models::{
    AlbumCuDto, AlbumEntity, ArtistCuDto, ArtistEntity, CatalogInfo, EntityKind, MusicGroupCuDto,
    MusicGroupEntity, Page, PageQuery,
};
use crate::requests;
use crate::transport::{Transport, UreqTransport};

/// Operations offered by the remote music catalog.
pub trait MusicService {
    fn info(&self) -> Result<CatalogInfo, ApiError>;
    fn seed(&self, count: usize) -> Result<CatalogInfo, ApiError>;
    fn remove_seed(&self, seeded: bool) -> Result<CatalogInfo, ApiError>;

    fn read_music_groups(&self, query: &PageQuery) -> Result<Page<MusicGroupEntity>, ApiError>;
    fn read_music_group(&self, id: Uuid, flat: bool) -> Result<MusicGroupEntity, ApiError>;
    fn create_music_group(&self, item: &MusicGroupCuDto) -> Result<MusicGroupEntity, ApiError>;
    fn update_music_group(
        &self,
        id: Uuid,
        item: &MusicGroupCuDto,
    ) -> Result<MusicGroupEntity, ApiError>;
    fn delete_music_group(&self, id: Uuid) -> Result<MusicGroupEntity, ApiError>;

    fn read_albums(&self, query: &PageQuery) -> Result<Page<AlbumEntity>, ApiError>;
    fn read_album(&self, id: Uuid, flat: bool) -> Result<AlbumEntity, ApiError>;
    fn create_album(&self, item: &AlbumCuDto) -> Result<AlbumEntity, ApiError>;
    fn update_album(&self, id: Uuid, item: &AlbumCuDto) -> Result<AlbumEntity, ApiError>;
    fn delete_album(&self, id: Uuid) -> Result<AlbumEntity, ApiError>;

    fn read_artists(&self, query: &PageQuery) -> Result<Page<ArtistEntity>, ApiError>;
    fn read_artist(&self, id: Uuid, flat: bool) -> Result<ArtistEntity, ApiError>;
    fn create_artist(&self, item: &ArtistCuDto) -> Result<ArtistEntity, ApiError>;
    fn update_artist(&self, id: Uuid, item: &ArtistCuDto) -> Result<ArtistEntity, ApiError>;
    fn upsert_artist(&self, item: &ArtistCuDto) -> Result<ArtistEntity, ApiError>;
    fn delete_artist(&self, id: Uuid) -> Result<ArtistEntity, ApiError>;
}

/// Blocking client for the catalog API.
#[derive(Debug, Clone)]
pub struct MusicClient<T> {
    transport: T,
}

impl MusicClient<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(UreqTransport::new(config))
    }
}

impl<T: Transport> MusicClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn execute<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending catalog request");
        let response = self.transport.send(&request)?;
        check_status(&request, &response)?;
        Ok(bridge::from_str(&response.body)?)
    }

    fn execute_for<R: DeserializeOwned>(
        &self,
        request: HttpRequest,
        entity: EntityKind,
        id: Uuid,
    ) -> Result<R, ApiError> {
        self.execute(request).map_err(|e| e.for_entity(entity, id))
    }
}

/// Map non-success status codes to `ApiError::Http`.
fn check_status(request: &HttpRequest, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(
        method = %request.method,
        path = %request.path,
        status = response.status,
        "catalog request failed"
    );
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn unsupported<R>(operation: &'static str) -> Result<R, ApiError> {
    debug!(operation, "operation not supported");
    Err(ApiError::Unsupported { operation })
}

impl<T: Transport> MusicService for MusicClient<T> {
    fn info(&self) -> Result<CatalogInfo, ApiError> {
        self.execute(requests::admin_info())
    }

    fn seed(&self, count: usize) -> Result<CatalogInfo, ApiError> {
        self.execute(requests::admin_seed(count))
    }

    fn remove_seed(&self, seeded: bool) -> Result<CatalogInfo, ApiError> {
        self.execute(requests::admin_remove_seed(seeded))
    }

    fn read_music_groups(&self, query: &PageQuery) -> Result<Page<MusicGroupEntity>, ApiError> {
        self.execute(requests::read_page(EntityKind::MusicGroup, query))
    }

    fn read_music_group(&self, id: Uuid, flat: bool) -> Result<MusicGroupEntity, ApiError> {
        let request = requests::read_item(EntityKind::MusicGroup, id, flat);
        self.execute_for(request, EntityKind::MusicGroup, id)
    }

    fn create_music_group(&self, item: &MusicGroupCuDto) -> Result<MusicGroupEntity, ApiError> {
        self.execute(requests::create_item(EntityKind::MusicGroup, item)?)
    }

    fn update_music_group(
        &self,
        id: Uuid,
        item: &MusicGroupCuDto,
    ) -> Result<MusicGroupEntity, ApiError> {
        let request = requests::update_item(EntityKind::MusicGroup, id, item)?;
        self.execute_for(request, EntityKind::MusicGroup, id)
    }

    fn delete_music_group(&self, id: Uuid) -> Result<MusicGroupEntity, ApiError> {
        let request = requests::delete_item(EntityKind::MusicGroup, id);
        self.execute_for(request, EntityKind::MusicGroup, id)
    }

    fn read_albums(&self, query: &PageQuery) -> Result<Page<AlbumEntity>, ApiError> {
        self.execute(requests::read_page(EntityKind::Album, query))
    }

    fn read_album(&self, id: Uuid, flat: bool) -> Result<AlbumEntity, ApiError> {
        let request = requests::read_item(EntityKind::Album, id, flat);
        self.execute_for(request, EntityKind::Album, id)
    }

    fn create_album(&self, _item: &AlbumCuDto) -> Result<AlbumEntity, ApiError> {
        unsupported("create_album")
    }

    fn update_album(&self, _id: Uuid, _item: &AlbumCuDto) -> Result<AlbumEntity, ApiError> {
        unsupported("update_album")
    }

    fn delete_album(&self, _id: Uuid) -> Result<AlbumEntity, ApiError> {
        unsupported("delete_album")
    }

    fn read_artists(&self, query: &PageQuery) -> Result<Page<ArtistEntity>, ApiError> {
        self.execute(requests::read_page(EntityKind::Artist, query))
    }

    fn read_artist(&self, id: Uuid, flat: bool) -> Result<ArtistEntity, ApiError> {
        let request = requests::read_item(EntityKind::Artist, id, flat);
        self.execute_for(request, EntityKind::Artist, id)
    }

    fn create_artist(&self, _item: &ArtistCuDto) -> Result<ArtistEntity, ApiError> {
        unsupported("create_artist")
    }

    fn update_artist(&self, _id: Uuid, _item: &ArtistCuDto) -> Result<ArtistEntity, ApiError> {
        unsupported("update_artist")
    }

    fn upsert_artist(&self, _item: &ArtistCuDto) -> Result<ArtistEntity, ApiError> {
        unsupported("upsert_artist")
    }

    fn delete_artist(&self, _id: Uuid) -> Result<ArtistEntity, ApiError> {
        unsupported("delete_artist")
    }
}
