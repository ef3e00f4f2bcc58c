//! `MusicClient` against a recording fake transport.
//!
//! The fake answers from a queue of canned responses and records every
//! request it receives, so tests can assert both the outbound contract and
//! how many network calls an operation made.

use std::collections::VecDeque;
use std::sync::Mutex;

use music_core::{
    AlbumCuDto, AlbumView, ApiError, ArtistCuDto, ArtistView, EntityKind, HttpMethod, HttpRequest,
    HttpResponse, MusicClient, MusicGenre, MusicGroupCuDto, MusicGroupView, MusicService,
    PageQuery, Transport,
};
use uuid::Uuid;

const GROUP_ID: &str = "11111111-1111-1111-1111-111111111111";

#[derive(Default)]
struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    fn answering(status: u16, body: &str) -> Self {
        let fake = Self::default();
        fake.push(status, body);
        fake
    }

    fn failing(message: &str) -> Self {
        let fake = Self::default();
        fake.responses
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport(message.to_string())));
        fake
    }

    fn push(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request")
    }
}

fn group_json(name: &str) -> String {
    format!(r#"{{"musicGroupId":"{GROUP_ID}","name":"{name}","establishedYear":1968,"genre":0}}"#)
}

// ---------------------------------------------------------------------------
// Status mapping
// ---------------------------------------------------------------------------

#[test]
fn delete_404_is_entity_not_found() {
    let fake = FakeTransport::answering(404, "");
    let client = MusicClient::new(&fake);
    let id: Uuid = GROUP_ID.parse().unwrap();

    let err = client.delete_music_group(id).unwrap_err();

    assert!(matches!(
        err,
        ApiError::EntityNotFound {
            entity: EntityKind::MusicGroup,
            ..
        }
    ));
    assert!(err.is_not_found());
    assert_eq!(fake.calls(), 1);
}

#[test]
fn delete_500_is_a_generic_failure_with_status() {
    let fake = FakeTransport::answering(500, "database unavailable");
    let client = MusicClient::new(&fake);

    let err = client.delete_music_group(Uuid::new_v4()).unwrap_err();

    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[test]
fn delete_success_returns_the_deleted_group() {
    let fake = FakeTransport::answering(200, &group_json("Led Zeppelin"));
    let client = MusicClient::new(&fake);
    let id: Uuid = GROUP_ID.parse().unwrap();

    let deleted = client.delete_music_group(id).unwrap();

    assert_eq!(deleted.name(), "Led Zeppelin");
    let req = fake.last_request();
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(req.path, format!("musicgroup/deleteitem/{GROUP_ID}"));
    assert!(req.body.is_none());
}

#[test]
fn transport_failure_propagates_unchanged() {
    let fake = FakeTransport::failing("connection refused");
    let client = MusicClient::new(&fake);

    let err = client.read_music_group(Uuid::nil(), true).unwrap_err();

    assert!(matches!(err, ApiError::Transport(ref msg) if msg == "connection refused"));
    assert_eq!(fake.calls(), 1);
}

#[test]
fn update_404_is_entity_not_found() {
    let fake = FakeTransport::answering(404, "");
    let client = MusicClient::new(&fake);
    let id = Uuid::new_v4();

    let err = client
        .update_music_group(id, &MusicGroupCuDto::default())
        .unwrap_err();

    assert!(matches!(err, ApiError::EntityNotFound { id: found, .. } if found == id));
}

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

#[test]
fn stub_operations_never_touch_the_transport() {
    let fake = FakeTransport::default();
    let client = MusicClient::new(&fake);
    let id = Uuid::new_v4();

    let results = [
        ("create_album", client.create_album(&AlbumCuDto::default()).map(|_| ())),
        ("update_album", client.update_album(id, &AlbumCuDto::default()).map(|_| ())),
        ("delete_album", client.delete_album(id).map(|_| ())),
        ("create_artist", client.create_artist(&ArtistCuDto::default()).map(|_| ())),
        ("update_artist", client.update_artist(id, &ArtistCuDto::default()).map(|_| ())),
        ("upsert_artist", client.upsert_artist(&ArtistCuDto::default()).map(|_| ())),
        ("delete_artist", client.delete_artist(id).map(|_| ())),
    ];

    for (name, result) in results {
        match result {
            Err(ApiError::Unsupported { operation }) => assert_eq!(operation, name),
            other => panic!("{name}: expected Unsupported, got {other:?}"),
        }
    }
    assert_eq!(fake.calls(), 0);
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[test]
fn read_music_groups_substitutes_nested_items() {
    let body = format!(
        r#"{{
            "pageItems": [
                {{
                    "musicGroupId": "{GROUP_ID}",
                    "name": "Deep Purple",
                    "genre": 0,
                    "albums": [{{"albumId": "22222222-2222-2222-2222-222222222222", "name": "Machine Head", "releaseYear": 1972}}],
                    "artists": [{{"artistId": "33333333-3333-3333-3333-333333333333", "firstName": "Jon", "lastName": "Lord"}}]
                }}
            ],
            "dbItemsCount": 1,
            "pageNr": 0,
            "pageSize": 10,
            "pageCount": 1
        }}"#
    );
    let fake = FakeTransport::answering(200, &body);
    let client = MusicClient::new(&fake);

    let query = PageQuery::default().flat(false).filter("deep");
    let page = client.read_music_groups(&query).unwrap();

    let req = fake.last_request();
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.path, "musicgroup/read");
    assert_eq!(
        req.url("http://h/api"),
        "http://h/api/musicgroup/read?seeded=true&flat=false&filter=deep&pagenr=0&pagesize=10"
    );

    assert_eq!(page.len(), 1);
    assert!(!page.has_next_page());
    let group = &page.page_items[0];
    assert_eq!(group.genre(), Some(MusicGenre::Rock));
    assert_eq!(group.albums()[0].name(), "Machine Head");
    assert_eq!(group.albums()[0].release_year(), 1972);
    assert_eq!(group.artists()[0].full_name(), "Jon Lord");
}

#[test]
fn read_album_and_artist_by_id() {
    let fake = FakeTransport::default();
    fake.push(
        200,
        r#"{"albumId":"22222222-2222-2222-2222-222222222222","name":"Machine Head","musicGroup":{"musicGroupId":"11111111-1111-1111-1111-111111111111","name":"Deep Purple"}}"#,
    );
    fake.push(
        200,
        r#"{"artistId":"33333333-3333-3333-3333-333333333333","firstName":"Ian","lastName":"Gillan","birthDay":"1945-08-19T00:00:00"}"#,
    );
    let client = MusicClient::new(&fake);

    let album_id: Uuid = "22222222-2222-2222-2222-222222222222".parse().unwrap();
    let album = client.read_album(album_id, false).unwrap();
    assert_eq!(album.music_group().unwrap().name(), "Deep Purple");
    assert_eq!(
        fake.last_request().url("http://h"),
        format!("http://h/album/readitem?id={album_id}&flat=false")
    );

    let artist_id: Uuid = "33333333-3333-3333-3333-333333333333".parse().unwrap();
    let artist = client.read_artist(artist_id, true).unwrap();
    assert_eq!(artist.last_name(), "Gillan");
    assert_eq!(fake.last_request().path, "artist/readitem");
    assert_eq!(fake.calls(), 2);
}

#[test]
fn malformed_page_reports_the_missing_field() {
    let fake = FakeTransport::answering(200, r#"{"pageItems":[{"name":"no id"}]}"#);
    let client = MusicClient::new(&fake);

    let err = client.read_music_groups(&PageQuery::default()).unwrap_err();

    assert!(err.to_string().contains("musicGroupId"), "{err}");
    match err {
        ApiError::Malformed(inner) => {
            let path = inner.path().unwrap_or_default();
            assert!(path.starts_with("pageItems[0]"), "{path}");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn wrong_field_type_in_nested_album_reports_its_path() {
    let body = format!(
        r#"{{"pageItems":[{{"musicGroupId":"{GROUP_ID}","name":"X","albums":[{{"albumId":"{GROUP_ID}","name":"Y","releaseYear":"soon"}}]}}]}}"#
    );
    let fake = FakeTransport::answering(200, &body);
    let client = MusicClient::new(&fake);

    let err = client.read_music_groups(&PageQuery::default()).unwrap_err();

    match err {
        ApiError::Malformed(inner) => {
            assert_eq!(inner.path(), Some("pageItems[0].albums[0].releaseYear"));
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[test]
fn create_music_group_posts_the_dto() {
    let fake = FakeTransport::answering(200, &group_json("Cream"));
    let client = MusicClient::new(&fake);
    let dto = MusicGroupCuDto {
        name: "Cream".to_string(),
        established_year: 1966,
        genre: Some(MusicGenre::Blues),
        ..Default::default()
    };

    let created = client.create_music_group(&dto).unwrap();

    assert_eq!(created.name(), "Cream");
    let req = fake.last_request();
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.path, "musicgroup/createitem");
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["name"], "Cream");
    assert_eq!(body["genre"], 1);
}

#[test]
fn update_music_group_puts_to_the_id_route() {
    let fake = FakeTransport::answering(200, &group_json("Renamed"));
    let client = MusicClient::new(&fake);
    let id: Uuid = GROUP_ID.parse().unwrap();

    let updated = client
        .update_music_group(
            id,
            &MusicGroupCuDto {
                music_group_id: Some(id),
                name: "Renamed".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name(), "Renamed");
    let req = fake.last_request();
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(req.path, format!("musicgroup/updateitem/{GROUP_ID}"));
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["musicGroupId"], GROUP_ID);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[test]
fn admin_operations_decode_catalog_info() {
    let fake = FakeTransport::default();
    fake.push(200, r#"{"db":{"nrSeededMusicGroups":5}}"#);
    fake.push(200, r#"{"db":{"nrSeededMusicGroups":0,"nrUnseededMusicGroups":1}}"#);
    let client = MusicClient::new(&fake);

    let seeded = client.seed(5).unwrap();
    assert_eq!(seeded.db.nr_seeded_music_groups, 5);
    assert_eq!(fake.last_request().url("http://h"), "http://h/admin/seed?count=5");

    let removed = client.remove_seed(true).unwrap();
    assert_eq!(removed.db.total_music_groups(), 1);
    assert_eq!(
        fake.last_request().url("http://h"),
        "http://h/admin/removeseed?seeded=true"
    );
}
