//! Request plumbing shared by every route: request ids, API keys and the
//! request budget. Rejections use the same error envelope as the handlers.

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use crawldex_core::{ConfigError, Environment};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";
const API_KEYS_VAR: &str = "CRAWLDEX_API_KEYS";

/// Id of the current request, available as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer tokens accepted on the results routes. `None` leaves them open.
#[derive(Debug, Clone)]
pub struct ApiKeys(Option<Arc<HashSet<String>>>);

impl ApiKeys {
    /// Reads `CRAWLDEX_API_KEYS` (comma-separated).
    ///
    /// # Errors
    ///
    /// See [`ApiKeys::parse`].
    pub fn from_env(env: &Environment) -> Result<Self, ConfigError> {
        Self::parse(&std::env::var(API_KEYS_VAR).unwrap_or_default(), env)
    }

    /// An empty list opens the API in development only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] when no key is given outside
    /// development.
    pub fn parse(raw: &str, env: &Environment) -> Result<Self, ConfigError> {
        let keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if !keys.is_empty() {
            return Ok(Self(Some(Arc::new(keys))));
        }
        if *env == Environment::Development {
            tracing::warn!(env = %env, "{API_KEYS_VAR} not set; results routes are open");
            return Ok(Self(None));
        }
        Err(ConfigError::InvalidEnvVar {
            var: API_KEYS_VAR.to_string(),
            reason: format!("at least one key is required in {env}"),
        })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.0.is_none()
    }

    fn admits(&self, authorization: Option<&HeaderValue>) -> bool {
        match &self.0 {
            None => true,
            Some(keys) => bearer_token(authorization).is_some_and(|token| keys.contains(token)),
        }
    }
}

/// Fixed-window budget of requests shared by every protected route.
#[derive(Debug, Clone)]
pub struct RequestBudget {
    limit: usize,
    window: Duration,
    spent: Arc<Mutex<(Instant, usize)>>,
}

impl RequestBudget {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            spent: Arc::new(Mutex::new((Instant::now(), 0))),
        }
    }

    #[must_use]
    pub fn per_minute(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Takes one request from the current window, starting a new window once
    /// the old one has elapsed. `false` once the window is used up.
    pub async fn try_spend(&self) -> bool {
        let mut spent = self.spent.lock().await;
        let (started, count) = &mut *spent;
        if started.elapsed() >= self.window {
            *started = Instant::now();
            *count = 0;
        }
        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }
}

/// Reuses an incoming `x-request-id` or mints a `UUIDv4`, stores it as a
/// [`RequestId`] extension and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

pub async fn require_api_key(State(keys): State<ApiKeys>, req: Request, next: Next) -> Response {
    if keys.admits(req.headers().get(AUTHORIZATION)) {
        return next.run(req).await;
    }
    tracing::debug!(path = %req.uri().path(), "rejected request without a valid api key");
    reject(&req, "unauthorized", "missing or invalid bearer token")
}

pub async fn spend_request_budget(
    State(budget): State<RequestBudget>,
    req: Request,
    next: Next,
) -> Response {
    if budget.try_spend().await {
        return next.run(req).await;
    }
    tracing::warn!(limit = budget.limit, "request budget exhausted");
    reject(&req, "rate_limited", "rate limit exceeded")
}

fn reject(req: &Request, code: &str, message: &str) -> Response {
    let id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    ApiError::new(id, code, message).into_response()
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
