use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};

use crate::{
    error::AppError,
    middleware::auth::AdminSession,
    models::listing::{CreateListingPayload, CreateListingResponse, Listing, OkResponse},
    state::AppState,
    types::ListingId,
};

/// Create-listing body. Urlencoded forms and JSON are accepted; any other
/// content type, or an empty body, is an empty payload so validation reports
/// the missing title.
#[derive(Debug)]
pub struct ListingBody(pub CreateListingPayload);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Form,
    Json,
    Other,
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let mime = content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .unwrap_or_default();
    if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else if mime.eq_ignore_ascii_case("application/json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

impl<S> FromRequest<S> for ListingBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = body_kind(
            req.headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );

        match kind {
            BodyKind::Form => {
                let Form(payload) = Form::<CreateListingPayload>::from_request(req, state)
                    .await
                    .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
                Ok(Self(payload))
            }
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self(CreateListingPayload::default()));
                }
                serde_json::from_slice(&bytes)
                    .map(Self)
                    .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
            }
            BodyKind::Other => Ok(Self(CreateListingPayload::default())),
        }
    }
}

/// Public catalogue, newest first.
pub async fn list_listings(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, AppError> {
    Ok(Json(state.listings.list_all().await?))
}

pub async fn create_listing(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ListingBody(payload): ListingBody,
) -> Result<Json<CreateListingResponse>, AppError> {
    let listing = payload.into_listing(&admin.id)?;
    let item = state.listings.create(&listing).await?;
    tracing::info!(listing_id = %item.id, owner = %item.owner_steam_id, "Listing created");
    Ok(Json(CreateListingResponse { ok: true, item }))
}

/// Deleting an unknown id is not an error. Ids that cannot name a listing
/// never reach the store.
pub async fn delete_listing(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, AppError> {
    match id.parse::<ListingId>() {
        Ok(listing_id) => {
            state.listings.delete_by_id(listing_id).await?;
            tracing::info!(listing_id = %listing_id, admin = %admin.id, "Listing deleted");
        }
        Err(_) => {
            tracing::debug!(id = %id, "Ignoring delete for malformed listing id");
        }
    }
    Ok(Json(OkResponse { ok: true }))
}
