//! Catalog domain model as seen by callers.
//!
//! # Design
//! Each entity family has one concrete record (`MusicGroup`, `Album`,
//! `Artist`) and one capability trait (`MusicGroupView`, ...). Responses are
//! decoded into `Entity<dyn ...View>` handles, so callers program against the
//! accessors only. The concrete records stay public because they are the
//! shapes the remote API speaks and are needed to build fixtures.
//!
//! Relationship lists come back empty, absent or `null` depending on the
//! `flat` flag of the request; all three decode as an empty list.

use std::fmt;

use chrono::NaiveDateTime;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::bridge::Entity;

pub type MusicGroupEntity = Entity<dyn MusicGroupView>;
pub type AlbumEntity = Entity<dyn AlbumView>;
pub type ArtistEntity = Entity<dyn ArtistView>;

// ---------------------------------------------------------------------------
// Capability sets
// ---------------------------------------------------------------------------

pub trait MusicGroupView: fmt::Debug + Send + Sync {
    fn music_group_id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn established_year(&self) -> i32;
    fn genre(&self) -> Option<MusicGenre>;
    fn albums(&self) -> &[AlbumEntity];
    fn artists(&self) -> &[ArtistEntity];
    fn seeded(&self) -> bool;
}

pub trait AlbumView: fmt::Debug + Send + Sync {
    fn album_id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn release_year(&self) -> i32;
    fn copies_sold(&self) -> i64;
    fn music_group(&self) -> Option<&MusicGroupEntity>;
    fn seeded(&self) -> bool;
}

pub trait ArtistView: fmt::Debug + Send + Sync {
    fn artist_id(&self) -> Uuid;
    fn first_name(&self) -> &str;
    fn last_name(&self) -> &str;
    fn birth_day(&self) -> Option<NaiveDateTime>;
    fn music_groups(&self) -> &[MusicGroupEntity];
    fn seeded(&self) -> bool;

    fn full_name(&self) -> String {
        format!("{} {}", self.first_name(), self.last_name())
    }
}

crate::register_type_pair!(MusicGroup => dyn MusicGroupView);
crate::register_type_pair!(Album => dyn AlbumView);
crate::register_type_pair!(Artist => dyn ArtistView);

// ---------------------------------------------------------------------------
// Concrete records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicGroup {
    pub music_group_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub established_year: i32,
    #[serde(default)]
    pub genre: Option<MusicGenre>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub albums: Vec<AlbumEntity>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub artists: Vec<ArtistEntity>,
    #[serde(default)]
    pub seeded: bool,
}

impl MusicGroupView for MusicGroup {
    fn music_group_id(&self) -> Uuid {
        self.music_group_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn established_year(&self) -> i32 {
        self.established_year
    }

    fn genre(&self) -> Option<MusicGenre> {
        self.genre
    }

    fn albums(&self) -> &[AlbumEntity] {
        &self.albums
    }

    fn artists(&self) -> &[ArtistEntity] {
        &self.artists
    }

    fn seeded(&self) -> bool {
        self.seeded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub album_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub release_year: i32,
    #[serde(default)]
    pub copies_sold: i64,
    #[serde(default)]
    pub music_group: Option<MusicGroupEntity>,
    #[serde(default)]
    pub seeded: bool,
}

impl AlbumView for Album {
    fn album_id(&self) -> Uuid {
        self.album_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn release_year(&self) -> i32 {
        self.release_year
    }

    fn copies_sold(&self) -> i64 {
        self.copies_sold
    }

    fn music_group(&self) -> Option<&MusicGroupEntity> {
        self.music_group.as_ref()
    }

    fn seeded(&self) -> bool {
        self.seeded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub artist_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_day: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub music_groups: Vec<MusicGroupEntity>,
    #[serde(default)]
    pub seeded: bool,
}

impl ArtistView for Artist {
    fn artist_id(&self) -> Uuid {
        self.artist_id
    }

    fn first_name(&self) -> &str {
        &self.first_name
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn birth_day(&self) -> Option<NaiveDateTime> {
        self.birth_day
    }

    fn music_groups(&self) -> &[MusicGroupEntity] {
        &self.music_groups
    }

    fn seeded(&self) -> bool {
        self.seeded
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

/// Music genre. On the wire this is the integer ordinal; names are accepted
/// on input too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicGenre {
    Rock,
    Blues,
    Jazz,
    Metal,
}

impl MusicGenre {
    pub const ALL: [MusicGenre; 4] = [
        MusicGenre::Rock,
        MusicGenre::Blues,
        MusicGenre::Jazz,
        MusicGenre::Metal,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|genre| genre.to_string().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MusicGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MusicGenre::Rock => "Rock",
            MusicGenre::Blues => "Blues",
            MusicGenre::Jazz => "Jazz",
            MusicGenre::Metal => "Metal",
        };
        f.write_str(name)
    }
}

impl Serialize for MusicGenre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for MusicGenre {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GenreVisitor;

        impl Visitor<'_> for GenreVisitor {
            type Value = MusicGenre;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a genre ordinal (0-3) or genre name")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MusicGenre, E> {
                MusicGenre::from_code(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MusicGenre, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(MusicGenre::from_code)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MusicGenre, E> {
                MusicGenre::from_name(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(GenreVisitor)
    }
}

// ---------------------------------------------------------------------------
// Envelopes and DTOs
// ---------------------------------------------------------------------------

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_items: Vec<T>,
    #[serde(default)]
    pub db_items_count: usize,
    #[serde(default)]
    pub page_items_start_index: usize,
    #[serde(default)]
    pub page_items_end_index: usize,
    #[serde(default)]
    pub page_nr: usize,
    #[serde(default)]
    pub page_size: usize,
    #[serde(default)]
    pub page_count: usize,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.page_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.page_items.iter()
    }

    /// Page numbers are zero based.
    pub fn has_next_page(&self) -> bool {
        self.page_nr + 1 < self.page_count
    }

    pub fn into_items(self) -> Vec<T> {
        self.page_items
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parameters of a `read` (list) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub seeded: bool,
    /// When set, related entities are not expanded.
    pub flat: bool,
    pub filter: String,
    pub page_nr: usize,
    pub page_size: usize,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            seeded: true,
            flat: true,
            filter: String::new(),
            page_nr: 0,
            page_size: 10,
        }
    }
}

impl PageQuery {
    pub fn page(mut self, page_nr: usize, page_size: usize) -> Self {
        self.page_nr = page_nr;
        self.page_size = page_size;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn seeded(mut self, seeded: bool) -> Self {
        self.seeded = seeded;
        self
    }

    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }
}

/// Catalog-wide status returned by the admin endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogInfo {
    #[serde(default)]
    pub db: CatalogDbInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogDbInfo {
    pub nr_seeded_music_groups: usize,
    pub nr_unseeded_music_groups: usize,
    pub nr_seeded_albums: usize,
    pub nr_unseeded_albums: usize,
    pub nr_seeded_artists: usize,
    pub nr_unseeded_artists: usize,
}

impl CatalogDbInfo {
    pub fn total_music_groups(&self) -> usize {
        self.nr_seeded_music_groups + self.nr_unseeded_music_groups
    }

    pub fn total_albums(&self) -> usize {
        self.nr_seeded_albums + self.nr_unseeded_albums
    }

    pub fn total_artists(&self) -> usize {
        self.nr_seeded_artists + self.nr_unseeded_artists
    }
}

/// Create/update payload for a music group. Related entities are referenced
/// by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicGroupCuDto {
    pub music_group_id: Option<Uuid>,
    pub name: String,
    pub established_year: i32,
    pub genre: Option<MusicGenre>,
    #[serde(default)]
    pub albums_id: Vec<Uuid>,
    #[serde(default)]
    pub artists_id: Vec<Uuid>,
}

impl MusicGroupCuDto {
    pub fn from_view(group: &dyn MusicGroupView) -> Self {
        Self {
            music_group_id: Some(group.music_group_id()),
            name: group.name().to_string(),
            established_year: group.established_year(),
            genre: group.genre(),
            albums_id: group.albums().iter().map(|a| a.album_id()).collect(),
            artists_id: group.artists().iter().map(|a| a.artist_id()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumCuDto {
    pub album_id: Option<Uuid>,
    pub name: String,
    pub release_year: i32,
    pub copies_sold: i64,
    pub music_group_id: Option<Uuid>,
}

impl AlbumCuDto {
    pub fn from_view(album: &dyn AlbumView) -> Self {
        Self {
            album_id: Some(album.album_id()),
            name: album.name().to_string(),
            release_year: album.release_year(),
            copies_sold: album.copies_sold(),
            music_group_id: album.music_group().map(|g| g.music_group_id()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCuDto {
    pub artist_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub birth_day: Option<NaiveDateTime>,
    #[serde(default)]
    pub music_groups_id: Vec<Uuid>,
}

impl ArtistCuDto {
    pub fn from_view(artist: &dyn ArtistView) -> Self {
        Self {
            artist_id: Some(artist.artist_id()),
            first_name: artist.first_name().to_string(),
            last_name: artist.last_name().to_string(),
            birth_day: artist.birth_day(),
            music_groups_id: artist
                .music_groups()
                .iter()
                .map(|g| g.music_group_id())
                .collect(),
        }
    }
}

/// Entity families exposed by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    MusicGroup,
    Album,
    Artist,
}

impl EntityKind {
    /// Route segment of the family's endpoints.
    pub fn segment(self) -> &'static str {
        match self {
            EntityKind::MusicGroup => "musicgroup",
            EntityKind::Album => "album",
            EntityKind::Artist => "artist",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::MusicGroup => "music group",
            EntityKind::Album => "album",
            EntityKind::Artist => "artist",
        };
        f.write_str(name)
    }
}
