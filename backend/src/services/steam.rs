//! Steam OpenID 2.0 identity provider.
//!
//! The handshake is driven by two HTTP entry points:
//!
//! 1. `GET /auth/steam` redirects the browser to [`IdentityProvider::authorization_url`].
//! 2. Steam redirects back to the configured return URL with a signed
//!    assertion. [`IdentityProvider::verify`] checks the assertion locally,
//!    asks Steam to confirm its signature (`check_authentication`), and builds
//!    the [`SteamProfile`] that gets attached to a new session.
//!
//! Any failure ends the handshake; the caller falls back to an anonymous
//! session and nothing is retried.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::{
    config::Config,
    models::profile::{PlayerSummary, SteamProfile},
};

pub const STEAM_OPENID_ENDPOINT: &str = "https://steamcommunity.com/openid/login";
pub const STEAM_API_BASE: &str = "https://api.steampowered.com/";

const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";
const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";
const CLAIMED_ID_PREFIXES: [&str; 2] = [
    "https://steamcommunity.com/openid/id/",
    "http://steamcommunity.com/openid/id/",
];

#[derive(Debug, Error)]
pub enum OpenIdError {
    #[error("missing OpenID parameter {0}")]
    MissingParameter(&'static str),
    #[error("unexpected OpenID mode {0}")]
    UnexpectedMode(String),
    #[error("return_to does not match the configured return URL")]
    ReturnUrlMismatch,
    #[error("assertion came from unexpected endpoint {0}")]
    UnexpectedEndpoint(String),
    #[error("claimed id is not a Steam identity: {0}")]
    InvalidClaimedId(String),
    #[error("provider rejected the assertion")]
    AssertionRejected,
    #[error("invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where the browser is sent to start authentication.
    fn authorization_url(&self) -> String;

    /// Verifies the callback query parameters and returns the authenticated profile.
    async fn verify(&self, params: &HashMap<String, String>)
        -> Result<SteamProfile, OpenIdError>;
}

pub struct SteamOpenId {
    client: reqwest::Client,
    endpoint: Url,
    api_base: Url,
    return_url: String,
    realm: String,
    api_key: Option<String>,
}

impl SteamOpenId {
    pub fn new(config: &Config) -> Result<Self, OpenIdError> {
        Self::with_endpoints(config, STEAM_OPENID_ENDPOINT, STEAM_API_BASE)
    }

    pub fn with_endpoints(
        config: &Config,
        openid_endpoint: &str,
        api_base: &str,
    ) -> Result<Self, OpenIdError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(openid_endpoint)?,
            api_base: Url::parse(api_base)?,
            return_url: config.steam_return_url.clone(),
            realm: config.steam_realm.clone(),
            api_key: config.steam_api_key.clone(),
        })
    }

    /// Checks everything that can be checked without talking to Steam and
    /// returns `(steam_id, claimed_id)`.
    fn check_assertion<'a>(
        &self,
        params: &'a HashMap<String, String>,
    ) -> Result<(&'a str, &'a str), OpenIdError> {
        let mode = required(params, "openid.mode")?;
        if mode != "id_res" {
            return Err(OpenIdError::UnexpectedMode(mode.to_string()));
        }

        let return_to = required(params, "openid.return_to")?;
        if !return_to.starts_with(&self.return_url) {
            return Err(OpenIdError::ReturnUrlMismatch);
        }

        let op_endpoint = required(params, "openid.op_endpoint")?;
        if op_endpoint != self.endpoint.as_str() {
            return Err(OpenIdError::UnexpectedEndpoint(op_endpoint.to_string()));
        }

        let claimed_id = required(params, "openid.claimed_id")?;
        let steam_id = parse_steam_id(claimed_id)
            .ok_or_else(|| OpenIdError::InvalidClaimedId(claimed_id.to_string()))?;
        Ok((steam_id, claimed_id))
    }

    async fn confirm_with_provider(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<(), OpenIdError> {
        let mut form: Vec<(&str, &str)> = params
            .iter()
            .filter(|(key, _)| key.starts_with("openid.") && key.as_str() != "openid.mode")
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        form.push(("openid.mode", "check_authentication"));

        let body = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if assertion_is_valid(&body) {
            Ok(())
        } else {
            Err(OpenIdError::AssertionRejected)
        }
    }

    async fn fetch_player_summary(
        &self,
        api_key: &str,
        steam_id: &str,
    ) -> Result<Option<(PlayerSummary, Value)>, OpenIdError> {
        let url = self.api_base.join("ISteamUser/GetPlayerSummaries/v0002/")?;
        let body: Value = self
            .client
            .get(url)
            .query(&[("key", api_key), ("steamids", steam_id)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let raw = body
            .pointer("/response/players/0")
            .cloned()
            .filter(|player| player.get("steamid").and_then(Value::as_str) == Some(steam_id));
        Ok(raw.and_then(|raw| {
            serde_json::from_value::<PlayerSummary>(raw.clone())
                .ok()
                .map(|summary| (summary, raw))
        }))
    }

    async fn build_profile(&self, steam_id: &str, claimed_id: &str) -> SteamProfile {
        let Some(api_key) = self.api_key.as_deref() else {
            return SteamProfile::from_steam_id(steam_id, claimed_id);
        };

        match self.fetch_player_summary(api_key, steam_id).await {
            Ok(Some((summary, raw))) => SteamProfile::from_summary(summary, claimed_id, raw),
            Ok(None) => {
                tracing::warn!(steam_id, "Steam returned no player summary");
                SteamProfile::from_steam_id(steam_id, claimed_id)
            }
            Err(err) => {
                tracing::warn!(steam_id, error = %err, "Failed to fetch Steam player summary");
                SteamProfile::from_steam_id(steam_id, claimed_id)
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for SteamOpenId {
    fn authorization_url(&self) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("openid.ns", OPENID_NS)
            .append_pair("openid.mode", "checkid_setup")
            .append_pair("openid.return_to", &self.return_url)
            .append_pair("openid.realm", &self.realm)
            .append_pair("openid.identity", IDENTIFIER_SELECT)
            .append_pair("openid.claimed_id", IDENTIFIER_SELECT);
        url.to_string()
    }

    async fn verify(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<SteamProfile, OpenIdError> {
        let (steam_id, claimed_id) = self.check_assertion(params)?;
        self.confirm_with_provider(params).await?;
        tracing::info!(steam_id, "Steam assertion verified");
        Ok(self.build_profile(steam_id, claimed_id).await)
    }
}

fn required<'a>(
    params: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, OpenIdError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or(OpenIdError::MissingParameter(key))
}

/// Extracts the Steam64 id from a claimed identifier URL.
pub fn parse_steam_id(claimed_id: &str) -> Option<&str> {
    let id = CLAIMED_ID_PREFIXES
        .iter()
        .find_map(|prefix| claimed_id.strip_prefix(prefix))?;
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

/// Reads the `is_valid` field of an OpenID key-value form response.
pub fn assertion_is_valid(body: &str) -> bool {
    body.lines()
        .filter_map(|line| line.split_once(':'))
        .any(|(key, value)| key.trim() == "is_valid" && value.trim() == "true")
}
