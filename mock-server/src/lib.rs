//! In-memory stand-in for the music catalog web API.
//!
//! Entities are stored flat and related by id. Responses expand relations
//! one level deep unless the request asks for `flat=true`, in which case the
//! relation fields are `null`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicGroup {
    pub music_group_id: Uuid,
    pub name: String,
    pub established_year: i32,
    pub genre: Option<u8>,
    pub seeded: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub album_id: Uuid,
    pub name: String,
    pub release_year: i32,
    pub copies_sold: i64,
    pub music_group_id: Option<Uuid>,
    pub seeded: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub artist_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_day: Option<String>,
    pub music_group_ids: Vec<Uuid>,
    pub seeded: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicGroupInput {
    pub name: String,
    #[serde(default)]
    pub established_year: i32,
    #[serde(default)]
    pub genre: Option<u8>,
    #[serde(default)]
    pub albums_id: Vec<Uuid>,
    #[serde(default)]
    pub artists_id: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct ReadParams {
    #[serde(default = "default_true")]
    pub seeded: bool,
    #[serde(default = "default_true")]
    pub flat: bool,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub pagenr: usize,
    #[serde(default = "default_page_size")]
    pub pagesize: usize,
}

#[derive(Deserialize)]
pub struct ItemParams {
    pub id: Uuid,
    #[serde(default)]
    pub flat: bool,
}

#[derive(Deserialize)]
pub struct SeedParams {
    pub count: usize,
}

#[derive(Deserialize)]
pub struct RemoveSeedParams {
    pub seeded: bool,
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    10
}

const GROUP_ADJECTIVES: [&str; 6] = ["Velvet", "Iron", "Crimson", "Electric", "Silent", "Golden"];
const GROUP_NOUNS: [&str; 6] = ["Echo", "Harbor", "Tigers", "Engine", "Garden", "Riders"];
const FIRST_NAMES: [&str; 5] = ["Ann", "Bo", "Carla", "Dario", "Eve"];
const LAST_NAMES: [&str; 5] = ["Lind", "Moreau", "Okafor", "Svensson", "Tanaka"];
const ALBUMS_PER_GROUP: usize = 2;
const ARTISTS_PER_GROUP: usize = 2;

/// The whole catalog. Relations are held as ids on albums and artists.
#[derive(Debug, Default)]
pub struct Catalog {
    groups: HashMap<Uuid, MusicGroup>,
    albums: HashMap<Uuid, Album>,
    artists: HashMap<Uuid, Artist>,
}

impl Catalog {
    pub fn info(&self) -> Value {
        let groups = || self.groups.values().map(|g| g.seeded);
        let albums = || self.albums.values().map(|a| a.seeded);
        let artists = || self.artists.values().map(|a| a.seeded);
        json!({
            "db": {
                "nrSeededMusicGroups": count_flag(groups(), true),
                "nrUnseededMusicGroups": count_flag(groups(), false),
                "nrSeededAlbums": count_flag(albums(), true),
                "nrUnseededAlbums": count_flag(albums(), false),
                "nrSeededArtists": count_flag(artists(), true),
                "nrUnseededArtists": count_flag(artists(), false),
            }
        })
    }

    /// Adds `count` seeded groups, each with its own albums and artists.
    pub fn seed(&mut self, count: usize) {
        let offset = self.groups.len();
        for n in offset..offset + count {
            let group_id = Uuid::new_v4();
            let name = format!(
                "{} {}",
                GROUP_ADJECTIVES[n % GROUP_ADJECTIVES.len()],
                GROUP_NOUNS[(n / GROUP_ADJECTIVES.len()) % GROUP_NOUNS.len()]
            );
            for k in 0..ALBUMS_PER_GROUP {
                let album_id = Uuid::new_v4();
                self.albums.insert(
                    album_id,
                    Album {
                        album_id,
                        name: format!("{name} Vol. {}", k + 1),
                        release_year: 1970 + (n % 40) as i32 + k as i32,
                        copies_sold: 10_000 * (n as i64 + 1) * (k as i64 + 1),
                        music_group_id: Some(group_id),
                        seeded: true,
                    },
                );
            }
            for k in 0..ARTISTS_PER_GROUP {
                let artist_id = Uuid::new_v4();
                let i = n * ARTISTS_PER_GROUP + k;
                self.artists.insert(
                    artist_id,
                    Artist {
                        artist_id,
                        first_name: FIRST_NAMES[i % FIRST_NAMES.len()].to_string(),
                        last_name: LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()]
                            .to_string(),
                        birth_day: Some(format!("{}-01-01T00:00:00", 1940 + i % 50)),
                        music_group_ids: vec![group_id],
                        seeded: true,
                    },
                );
            }
            self.groups.insert(
                group_id,
                MusicGroup {
                    music_group_id: group_id,
                    name,
                    established_year: 1960 + (n % 50) as i32,
                    genre: Some((n % 4) as u8),
                    seeded: true,
                },
            );
        }
    }

    /// Removes every entity whose `seeded` flag equals `seeded`.
    pub fn remove_seed(&mut self, seeded: bool) {
        self.groups.retain(|_, g| g.seeded != seeded);
        self.albums.retain(|_, a| a.seeded != seeded);
        self.artists.retain(|_, a| a.seeded != seeded);
        let groups = &self.groups;
        for album in self.albums.values_mut() {
            if album.music_group_id.is_some_and(|id| !groups.contains_key(&id)) {
                album.music_group_id = None;
            }
        }
        for artist in self.artists.values_mut() {
            artist.music_group_ids.retain(|id| groups.contains_key(id));
        }
    }

    pub fn read_groups(&self, params: &ReadParams) -> Value {
        let mut groups: Vec<&MusicGroup> = self
            .groups
            .values()
            .filter(|g| {
                g.seeded == params.seeded && name_matches(&params.filter, &[g.name.as_str()])
            })
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.music_group_id.cmp(&b.music_group_id)));
        let items = groups.into_iter().map(|g| self.group_json(g, params.flat)).collect();
        page_json(items, params.pagenr, params.pagesize)
    }

    pub fn read_albums(&self, params: &ReadParams) -> Value {
        let mut albums: Vec<&Album> = self
            .albums
            .values()
            .filter(|a| {
                a.seeded == params.seeded && name_matches(&params.filter, &[a.name.as_str()])
            })
            .collect();
        albums.sort_by(|a, b| a.name.cmp(&b.name).then(a.album_id.cmp(&b.album_id)));
        let items = albums.into_iter().map(|a| self.album_json(a, params.flat)).collect();
        page_json(items, params.pagenr, params.pagesize)
    }

    pub fn read_artists(&self, params: &ReadParams) -> Value {
        let mut artists: Vec<&Artist> = self
            .artists
            .values()
            .filter(|a| {
                let names = [a.first_name.as_str(), a.last_name.as_str()];
                a.seeded == params.seeded && name_matches(&params.filter, &names)
            })
            .collect();
        artists.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.artist_id).cmp(&(
                &b.last_name,
                &b.first_name,
                b.artist_id,
            ))
        });
        let items = artists.into_iter().map(|a| self.artist_json(a, params.flat)).collect();
        page_json(items, params.pagenr, params.pagesize)
    }

    pub fn group(&self, id: Uuid, flat: bool) -> Option<Value> {
        self.groups.get(&id).map(|g| self.group_json(g, flat))
    }

    pub fn album(&self, id: Uuid, flat: bool) -> Option<Value> {
        self.albums.get(&id).map(|a| self.album_json(a, flat))
    }

    pub fn artist(&self, id: Uuid, flat: bool) -> Option<Value> {
        self.artists.get(&id).map(|a| self.artist_json(a, flat))
    }

    pub fn create_group(&mut self, input: MusicGroupInput) -> Value {
        let id = Uuid::new_v4();
        self.groups.insert(
            id,
            MusicGroup {
                music_group_id: id,
                name: input.name,
                established_year: input.established_year,
                genre: input.genre,
                seeded: false,
            },
        );
        self.link(id, &input.albums_id, &input.artists_id);
        info!(%id, "music group created");
        self.group_json(&self.groups[&id], false)
    }

    pub fn update_group(&mut self, id: Uuid, input: MusicGroupInput) -> Option<Value> {
        let group = self.groups.get_mut(&id)?;
        group.name = input.name;
        group.established_year = input.established_year;
        group.genre = input.genre;
        self.unlink(id);
        self.link(id, &input.albums_id, &input.artists_id);
        info!(%id, "music group updated");
        self.group(id, false)
    }

    pub fn delete_group(&mut self, id: Uuid) -> Option<Value> {
        let rendered = self.group(id, false)?;
        self.groups.remove(&id);
        self.unlink(id);
        info!(%id, "music group deleted");
        Some(rendered)
    }

    fn link(&mut self, group_id: Uuid, album_ids: &[Uuid], artist_ids: &[Uuid]) {
        for album_id in album_ids {
            if let Some(album) = self.albums.get_mut(album_id) {
                album.music_group_id = Some(group_id);
            }
        }
        for artist_id in artist_ids {
            if let Some(artist) = self.artists.get_mut(artist_id) {
                if !artist.music_group_ids.contains(&group_id) {
                    artist.music_group_ids.push(group_id);
                }
            }
        }
    }

    fn unlink(&mut self, group_id: Uuid) {
        for album in self.albums.values_mut() {
            if album.music_group_id == Some(group_id) {
                album.music_group_id = None;
            }
        }
        for artist in self.artists.values_mut() {
            artist.music_group_ids.retain(|id| *id != group_id);
        }
    }

    fn group_json(&self, group: &MusicGroup, flat: bool) -> Value {
        let mut value = json!({
            "musicGroupId": group.music_group_id,
            "name": group.name,
            "establishedYear": group.established_year,
            "genre": group.genre,
            "seeded": group.seeded,
            "albums": null,
            "artists": null,
        });
        if !flat {
            let mut albums: Vec<&Album> = self
                .albums
                .values()
                .filter(|a| a.music_group_id == Some(group.music_group_id))
                .collect();
            albums.sort_by(|a, b| a.name.cmp(&b.name));
            let mut artists: Vec<&Artist> = self
                .artists
                .values()
                .filter(|a| a.music_group_ids.contains(&group.music_group_id))
                .collect();
            artists.sort_by(|a, b| a.last_name.cmp(&b.last_name));
            value["albums"] = albums.into_iter().map(|a| self.album_json(a, true)).collect();
            value["artists"] = artists.into_iter().map(|a| self.artist_json(a, true)).collect();
        }
        value
    }

    fn album_json(&self, album: &Album, flat: bool) -> Value {
        let music_group = match album.music_group_id.and_then(|id| self.groups.get(&id)) {
            Some(group) if !flat => self.group_json(group, true),
            _ => Value::Null,
        };
        json!({
            "albumId": album.album_id,
            "name": album.name,
            "releaseYear": album.release_year,
            "copiesSold": album.copies_sold,
            "seeded": album.seeded,
            "musicGroup": music_group,
        })
    }

    fn artist_json(&self, artist: &Artist, flat: bool) -> Value {
        let music_groups = if flat {
            Value::Null
        } else {
            artist
                .music_group_ids
                .iter()
                .filter_map(|id| self.groups.get(id))
                .map(|g| self.group_json(g, true))
                .collect()
        };
        json!({
            "artistId": artist.artist_id,
            "firstName": artist.first_name,
            "lastName": artist.last_name,
            "birthDay": artist.birth_day,
            "seeded": artist.seeded,
            "musicGroups": music_groups,
        })
    }
}

fn count_flag(flags: impl Iterator<Item = bool>, wanted: bool) -> usize {
    flags.filter(|flag| *flag == wanted).count()
}

/// Case-insensitive substring match on any of `fields`; an empty filter
/// matches everything.
fn name_matches(filter: &str, fields: &[&str]) -> bool {
    let filter = filter.trim().to_lowercase();
    filter.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&filter))
}

fn page_json(items: Vec<Value>, page_nr: usize, page_size: usize) -> Value {
    let page_size = page_size.max(1);
    let total = items.len();
    let start = page_nr.saturating_mul(page_size);
    let page_items: Vec<Value> = items.into_iter().skip(start).take(page_size).collect();
    let end = start + page_items.len();
    json!({
        "pageItems": page_items,
        "dbItemsCount": total,
        "pageItemsStartIndex": start,
        "pageItemsEndIndex": end,
        "pageNr": page_nr,
        "pageSize": page_size,
        "pageCount": total.div_ceil(page_size),
    })
}

pub type Db = Arc<RwLock<Catalog>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Catalog::default()));
    let api = Router::new()
        .route("/admin/info", get(info_handler))
        .route("/admin/seed", get(seed_handler))
        .route("/admin/removeseed", get(remove_seed_handler))
        .route("/musicgroup/read", get(read_groups))
        .route("/musicgroup/readitem", get(read_group))
        .route("/musicgroup/createitem", post(create_group))
        .route("/musicgroup/updateitem/{id}", put(update_group))
        .route("/musicgroup/deleteitem/{id}", delete(delete_group))
        .route("/album/read", get(read_albums))
        .route("/album/readitem", get(read_album))
        .route("/artist/read", get(read_artists))
        .route("/artist/readitem", get(read_artist));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn info_handler(State(db): State<Db>) -> Json<Value> {
    Json(db.read().await.info())
}

async fn seed_handler(State(db): State<Db>, Query(params): Query<SeedParams>) -> Json<Value> {
    let mut catalog = db.write().await;
    catalog.seed(params.count);
    info!(count = params.count, "catalog seeded");
    Json(catalog.info())
}

async fn remove_seed_handler(
    State(db): State<Db>,
    Query(params): Query<RemoveSeedParams>,
) -> Json<Value> {
    let mut catalog = db.write().await;
    catalog.remove_seed(params.seeded);
    info!(seeded = params.seeded, "seed removed");
    Json(catalog.info())
}

async fn read_groups(State(db): State<Db>, Query(params): Query<ReadParams>) -> Json<Value> {
    Json(db.read().await.read_groups(&params))
}

async fn read_albums(State(db): State<Db>, Query(params): Query<ReadParams>) -> Json<Value> {
    Json(db.read().await.read_albums(&params))
}

async fn read_artists(State(db): State<Db>, Query(params): Query<ReadParams>) -> Json<Value> {
    Json(db.read().await.read_artists(&params))
}

async fn read_group(
    State(db): State<Db>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Value>, StatusCode> {
    db.read().await.group(params.id, params.flat).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn read_album(
    State(db): State<Db>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Value>, StatusCode> {
    db.read().await.album(params.id, params.flat).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn read_artist(
    State(db): State<Db>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Value>, StatusCode> {
    db.read().await.artist(params.id, params.flat).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_group(State(db): State<Db>, Json(input): Json<MusicGroupInput>) -> Json<Value> {
    Json(db.write().await.create_group(input))
}

async fn update_group(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<MusicGroupInput>,
) -> Result<Json<Value>, StatusCode> {
    db.write().await.update_group(id, input).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_group(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StatusCode> {
    db.write().await.delete_group(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}
