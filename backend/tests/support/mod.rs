#![allow(dead_code)]
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{
    collections::HashMap,
    env,
    sync::{Arc, Mutex},
};
use time::{Duration, OffsetDateTime};
use tower_sessions::{
    cookie::{Cookie, CookieJar, Key},
    session::{Id, Record},
    MemoryStore, SessionStore,
};
use gamevault_backend::{
    config::Config,
    error::AppError,
    models::{listing::Listing, profile::SteamProfile, session::SESSION_USER_KEY},
    repositories::ListingRepositoryTrait,
    router::router,
    services::steam::{parse_steam_id, IdentityProvider, OpenIdError},
    state::AppState,
    types::ListingId,
    utils::cookies::SESSION_COOKIE_NAME,
};

pub const ADMIN_STEAM_ID: &str = "76561198000000001";
pub const OTHER_STEAM_ID: &str = "76561198000000002";
pub const TEST_SECRET: &str = "integration-test-secret";
pub const FAKE_PROVIDER_URL: &str = "https://steam.test/openid/login?openid.mode=checkid_setup";

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "ADMIN_STEAM_ID" => Some(ADMIN_STEAM_ID.to_string()),
        "SESSION_SECRET" => Some(TEST_SECRET.to_string()),
        "STATIC_DIR" => Some("tests/static-missing".to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn profile(steam_id: &str) -> SteamProfile {
    SteamProfile::from_steam_id(
        steam_id,
        &format!("https://steamcommunity.com/openid/id/{steam_id}"),
    )
}

#[derive(Default)]
pub struct InMemoryListings {
    items: Mutex<Vec<Listing>>,
}

impl InMemoryListings {
    pub fn len(&self) -> usize {
        self.items.lock().expect("listings lock").len()
    }
}

#[async_trait]
impl ListingRepositoryTrait for InMemoryListings {
    async fn list_all(&self) -> Result<Vec<Listing>, AppError> {
        let mut items: Vec<Listing> = self
            .items
            .lock()
            .expect("listings lock")
            .iter()
            .rev()
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn create(&self, listing: &Listing) -> Result<Listing, AppError> {
        self.items
            .lock()
            .expect("listings lock")
            .push(listing.clone());
        Ok(listing.clone())
    }

    async fn delete_by_id(&self, id: ListingId) -> Result<(), AppError> {
        self.items
            .lock()
            .expect("listings lock")
            .retain(|listing| listing.id != id);
        Ok(())
    }
}

/// Accepts any `id_res` callback whose claimed id is a Steam identity.
pub struct FakeSteam;

#[async_trait]
impl IdentityProvider for FakeSteam {
    fn authorization_url(&self) -> String {
        FAKE_PROVIDER_URL.to_string()
    }

    async fn verify(&self, params: &HashMap<String, String>) -> Result<SteamProfile, OpenIdError> {
        if params.get("openid.mode").map(String::as_str) != Some("id_res") {
            return Err(OpenIdError::AssertionRejected);
        }
        let claimed_id = params
            .get("openid.claimed_id")
            .ok_or(OpenIdError::MissingParameter("openid.claimed_id"))?;
        let steam_id = parse_steam_id(claimed_id)
            .ok_or_else(|| OpenIdError::InvalidClaimedId(claimed_id.clone()))?;
        Ok(SteamProfile::from_steam_id(steam_id, claimed_id))
    }
}

pub struct TestApp {
    pub router: Router,
    pub listings: Arc<InMemoryListings>,
    pub store: MemoryStore,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let listings = Arc::new(InMemoryListings::default());
        let store = MemoryStore::default();
        let state = AppState::new(config.clone(), listings.clone(), Arc::new(FakeSteam));
        Self {
            router: router(state, store.clone()),
            listings,
            store,
            config,
        }
    }

    /// Stores a signed-in session for `steam_id` and returns its `Cookie` header.
    pub async fn login(&self, steam_id: &str) -> String {
        self.login_expiring_at(steam_id, OffsetDateTime::now_utc() + Duration::days(7))
            .await
    }

    pub async fn login_expiring_at(&self, steam_id: &str, expiry_date: OffsetDateTime) -> String {
        let mut record = Record {
            id: Id::default(),
            data: HashMap::from([(
                SESSION_USER_KEY.to_string(),
                serde_json::to_value(profile(steam_id)).expect("profile json"),
            )]),
            expiry_date,
        };
        self.store.create(&mut record).await.expect("seed session");
        signed_cookie(&self.config.session_key(), record.id)
    }
}

/// `Cookie` header carrying `id` signed with `key`.
pub fn signed_cookie(key: &Key, id: Id) -> String {
    let mut jar = CookieJar::new();
    jar.signed_mut(key)
        .add(Cookie::new(SESSION_COOKIE_NAME, id.to_string()));
    let cookie = jar.get(SESSION_COOKIE_NAME).expect("signed cookie");
    format!("{}={}", cookie.name(), cookie.value())
}

/// Turns a `Set-Cookie` response header into a `Cookie` request header.
pub fn cookie_from_response(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
        .to_string()
}

/// Pool for the Postgres repository tests; `None` skips them.
pub async fn test_pool() -> Option<PgPool> {
    let url = env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}
