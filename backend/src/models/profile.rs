//! Steam profile claim set attached to authenticated sessions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub const STEAM_PROVIDER: &str = "steam";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProfilePhoto {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SteamProfile {
    pub provider: String,
    /// Steam64 id.
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub photos: Vec<ProfilePhoto>,
    /// OpenID claimed identifier URL returned by Steam.
    pub identifier: String,
    /// Raw player summary from the Steam Web API, when one was fetched.
    #[serde(rename = "_json", default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub raw: Option<Value>,
}

/// Subset of `ISteamUser/GetPlayerSummaries` used to build a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSummary {
    pub steamid: String,
    #[serde(default)]
    pub personaname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub avatarmedium: Option<String>,
    #[serde(default)]
    pub avatarfull: Option<String>,
}

impl SteamProfile {
    /// Profile for a verified id when no player summary is available.
    pub fn from_steam_id(steam_id: &str, identifier: &str) -> Self {
        Self {
            provider: STEAM_PROVIDER.to_string(),
            id: steam_id.to_string(),
            display_name: steam_id.to_string(),
            photos: Vec::new(),
            identifier: identifier.to_string(),
            raw: None,
        }
    }

    pub fn from_summary(summary: PlayerSummary, identifier: &str, raw: Value) -> Self {
        let photos = [summary.avatar, summary.avatarmedium, summary.avatarfull]
            .into_iter()
            .flatten()
            .filter(|url| !url.is_empty())
            .map(|value| ProfilePhoto { value })
            .collect();
        let display_name = summary
            .personaname
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| summary.steamid.clone());

        Self {
            provider: STEAM_PROVIDER.to_string(),
            id: summary.steamid,
            display_name,
            photos,
            identifier: identifier.to_string(),
            raw: Some(raw),
        }
    }
}

/// Safe subset of the session user exposed by `GET /api/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeUser {
    pub id: String,
    pub display_name: String,
    pub photos: Vec<ProfilePhoto>,
}

impl From<&SteamProfile> for MeUser {
    fn from(profile: &SteamProfile) -> Self {
        Self {
            id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            photos: profile.photos.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: Option<MeUser>,
}
