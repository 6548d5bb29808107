// HTTP client for the pick'em backend's REST endpoints.
//
// `PickemApi` is the seam the command layer depends on; `HttpApi` is the
// reqwest-backed implementation. Responses are decoded into `wire` records
// and converted strictly, so a malformed payload fails with the offending
// field named.

use std::time::Duration;

use async_trait::async_trait;
use pickem_core::wire::{self, GameRecord, PickRecord, ResultRecord, WeekTotalRecord};
use pickem_core::{Game, GameResult, PickSet, PickemError, Week, WeeklyTotal};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::context::SessionContext;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {code}: {message}")]
    Status { code: u16, message: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Invalid(#[from] PickemError),

    #[error("a username is required for this request")]
    MissingUser,
}

/// The backend's `{status, message}` envelope for non-data replies.
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[allow(dead_code)]
    status: String,
    message: String,
}

/// Turn a non-success response body into `ApiError::Status`, using the
/// backend's message when the body is its JSON envelope.
pub fn status_error(code: u16, body: &str) -> ApiError {
    let message = match serde_json::from_str::<StatusBody>(body) {
        Ok(b) => b.message,
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    };
    ApiError::Status { code, message }
}

// ---------------------------------------------------------------------------
// PickemApi
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PickemApi: Send + Sync {
    /// Start a session. Required before `picks` and `submit_picks`.
    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError>;

    async fn current_week(&self) -> Result<Week, ApiError>;

    async fn games(&self, week: Week) -> Result<Vec<Game>, ApiError>;

    /// Every user's total for each week of `week.year` up to `week.week`.
    async fn cumulative_totals(&self, week: Week) -> Result<Vec<WeeklyTotal>, ApiError>;

    async fn results(&self, week: Week) -> Result<Vec<GameResult>, ApiError>;

    async fn picks(&self, ctx: &SessionContext) -> Result<PickSet, ApiError>;

    /// Store `picks`, returning the pick set as the server saved it.
    async fn submit_picks(&self, ctx: &SessionContext, picks: &PickSet) -> Result<PickSet, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.server.base_url,
            Duration::from_secs(config.server.timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(status.as_u16(), &body);
        warn!(%url, %err, "request rejected");
        Err(err)
    }

    async fn decode<R: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<R, ApiError> {
        response.json::<R>().await.map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<R, ApiError> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        let response = self.send(&url, self.http.get(&url).query(query)).await?;
        Self::decode(&url, response).await
    }
}

fn week_query(week: Week) -> Vec<(&'static str, String)> {
    vec![("year", week.year.to_string()), ("week", week.week.to_string())]
}

fn user_query(ctx: &SessionContext) -> Result<Vec<(&'static str, String)>, ApiError> {
    let username = ctx.username().ok_or(ApiError::MissingUser)?;
    let mut query = week_query(ctx.week());
    query.push(("username", username.to_string()));
    Ok(query)
}

#[async_trait]
impl PickemApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self.url("login");
        self.send(&url, self.http.post(&url).basic_auth(username, Some(password)))
            .await?;
        info!(username, "logged in");
        Ok(())
    }

    async fn current_week(&self) -> Result<Week, ApiError> {
        self.get("current", &[]).await
    }

    async fn games(&self, week: Week) -> Result<Vec<Game>, ApiError> {
        let records: Vec<GameRecord> = self.get("games", &week_query(week)).await?;
        Ok(wire::convert_all(records)?)
    }

    async fn cumulative_totals(&self, week: Week) -> Result<Vec<WeeklyTotal>, ApiError> {
        let mut query = week_query(week);
        query.push(("type", "cumulative".to_string()));
        let records: Vec<WeekTotalRecord> = self.get("totals", &query).await?;
        Ok(wire::convert_all(records)?)
    }

    async fn results(&self, week: Week) -> Result<Vec<GameResult>, ApiError> {
        let records: Vec<ResultRecord> = self.get("results", &week_query(week)).await?;
        Ok(wire::convert_all(records)?)
    }

    async fn picks(&self, ctx: &SessionContext) -> Result<PickSet, ApiError> {
        let records: Vec<PickRecord> = self.get("picks", &user_query(ctx)?).await?;
        Ok(wire::pick_set(records)?)
    }

    async fn submit_picks(&self, ctx: &SessionContext, picks: &PickSet) -> Result<PickSet, ApiError> {
        let url = self.url("picks");
        let query = user_query(ctx)?;
        debug!(%url, count = picks.len(), "POST picks");
        let response = self
            .send(&url, self.http.post(&url).query(&query).json(picks))
            .await?;
        let records: Vec<PickRecord> = Self::decode(&url, response).await?;
        Ok(wire::pick_set(records)?)
    }
}
