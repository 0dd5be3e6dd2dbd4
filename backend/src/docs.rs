#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use axum::Json;
use utoipa::OpenApi;

use crate::{
    error::ErrorResponse,
    models::{
        listing::{CreateListingPayload, CreateListingResponse, Listing, OkResponse},
        profile::{MeResponse, MeUser, ProfilePhoto},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        steam_login_doc,
        steam_return_doc,
        logout_doc,
        me_doc,
        list_listings_doc,
        create_listing_doc,
        delete_listing_doc
    ),
    components(
        schemas(
            // auth
            MeResponse,
            MeUser,
            ProfilePhoto,
            // listings
            Listing,
            CreateListingPayload,
            CreateListingResponse,
            OkResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Steam sign-in and session"),
        (name = "Listings", description = "Game listings catalogue")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/auth/steam",
    responses((status = 302, description = "Redirect to the Steam OpenID login page")),
    tag = "Auth"
)]
fn steam_login_doc() {}

#[utoipa::path(
    get,
    path = "/auth/steam/return",
    responses((status = 302, description = "Redirect home; sets the session cookie on success")),
    tag = "Auth"
)]
fn steam_return_doc() {}

#[utoipa::path(
    get,
    path = "/auth/logout",
    responses((status = 302, description = "Redirect home after signing out")),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Signed-in user, or null", body = MeResponse)),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    get,
    path = "/api/listings",
    responses((status = 200, description = "All listings, newest first", body = [Listing])),
    tag = "Listings"
)]
fn list_listings_doc() {}

#[utoipa::path(
    post,
    path = "/api/listings",
    request_body(
        content = CreateListingPayload,
        content_type = "application/json",
        description = "Also accepted as application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, body = CreateListingResponse),
        (status = 400, description = "Title missing or blank", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Signed in but not the admin", body = ErrorResponse)
    ),
    tag = "Listings"
)]
fn create_listing_doc() {}

#[utoipa::path(
    delete,
    path = "/api/listings/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Deleted, or nothing to delete", body = OkResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Signed in but not the admin", body = ErrorResponse)
    ),
    tag = "Listings"
)]
fn delete_listing_doc() {}
