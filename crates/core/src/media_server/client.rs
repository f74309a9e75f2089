//! HTTP client for the media server.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::MediaServerClientConfig;
use crate::metrics::{AUTH_ATTEMPTS, MEDIA_SERVER_REQUEST_DURATION};
use crate::settings::MediaServerSettings;

use super::auth::{bearer_header, composite_header, AuthContext, AuthSession, ClientIdentity};
use super::types::{
    ItemPage, ItemsResponse, LibraryView, RawAccount, SessionResponse, ViewsResponse,
};
use super::{MediaLibrary, MediaServerError};

/// Fields projected onto every item of a page.
const PAGE_FIELDS: &str = "Overview,Genres,ProviderIds,PremiereDate,CommunityRating";

/// Authenticating client for a single media server.
///
/// The handshake runs once on first use; the resulting credentials are reused
/// for every later request made through this instance.
pub struct MediaServerClient {
    client: Client,
    base_url: String,
    access_key: String,
    identity: ClientIdentity,
    item_types: Vec<String>,
    auth: RwLock<Option<AuthContext>>,
}

impl MediaServerClient {
    /// Create a new client. No network traffic happens until first use.
    pub fn new(
        settings: &MediaServerSettings,
        config: &MediaServerClientConfig,
        item_types: Vec<String>,
    ) -> Result<Self, MediaServerError> {
        if !settings.is_complete() {
            return Err(MediaServerError::NotConfigured(
                "url and access key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| MediaServerError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            access_key: settings.access_key.clone(),
            identity: ClientIdentity::from_config(config),
            item_types,
            auth: RwLock::new(None),
        })
    }

    /// Establish (or reuse) an authorized calling context.
    ///
    /// The keyed session handshake is tried first. Only when it fails is the
    /// direct token probe attempted, exactly once. When both fail the error
    /// carries both reasons.
    pub async fn authenticate(&self) -> Result<AuthSession, MediaServerError> {
        if let Some(ctx) = self.auth.read().await.as_ref() {
            return Ok(ctx.session());
        }

        let mut guard = self.auth.write().await;
        if let Some(ctx) = guard.as_ref() {
            return Ok(ctx.session());
        }

        let ctx = match self.login_keyed_session().await {
            Ok(ctx) => {
                AUTH_ATTEMPTS
                    .with_label_values(&["keyed_session", "success"])
                    .inc();
                ctx
            }
            Err(session_err) => {
                AUTH_ATTEMPTS
                    .with_label_values(&["keyed_session", "failure"])
                    .inc();
                warn!(error = %session_err, "Keyed session handshake failed, trying direct token");

                match self.probe_direct_token().await {
                    Ok(ctx) => {
                        AUTH_ATTEMPTS
                            .with_label_values(&["direct_token", "success"])
                            .inc();
                        ctx
                    }
                    Err(token_err) => {
                        AUTH_ATTEMPTS
                            .with_label_values(&["direct_token", "failure"])
                            .inc();
                        return Err(MediaServerError::AuthenticationFailed(format!(
                            "keyed session: {}; direct token: {}",
                            session_err, token_err
                        )));
                    }
                }
            }
        };

        info!(
            strategy = ctx.strategy.as_str(),
            account_id = %ctx.account_id,
            "Authenticated against media server"
        );

        let session = ctx.session();
        *guard = Some(ctx);
        Ok(session)
    }

    /// Authorized GET against `path`, decoding the JSON body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MediaServerError> {
        self.request_as("request", path, query).await
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MediaServerError> {
        self.authenticate().await?;
        let header = {
            let guard = self.auth.read().await;
            match guard.as_ref() {
                Some(ctx) => ctx.authorization_header(&self.identity, &self.access_key),
                None => {
                    return Err(MediaServerError::AuthenticationFailed(
                        "no session established".to_string(),
                    ))
                }
            }
        };

        let url = format!("{}{}", self.base_url, path);
        debug!(operation, path, "Media server request");

        let start = Instant::now();
        let result = self
            .client
            .get(&url)
            .header(AUTHORIZATION, header)
            .query(query)
            .send()
            .await;

        let status_label = match &result {
            Ok(response) => response.status().as_u16().to_string(),
            Err(_) => "error".to_string(),
        };
        MEDIA_SERVER_REQUEST_DURATION
            .with_label_values(&[operation, status_label.as_str()])
            .observe(start.elapsed().as_secs_f64());

        let response = result.map_err(map_transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(MediaServerError::Unauthorized(format!(
                "{} rejected the credentials",
                path
            )));
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MediaServerError::ParseError(e.to_string()))
    }

    /// Keyed session handshake: exchange the access key for a session token.
    async fn login_keyed_session(&self) -> Result<AuthContext, MediaServerError> {
        let url = format!("{}/Sessions/ApiKey", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                AUTHORIZATION,
                composite_header(&self.identity, &self.access_key, None),
            )
            .header("X-Emby-Token", &self.access_key)
            .json(&serde_json::json!({ "ApiKey": self.access_key }))
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| MediaServerError::ParseError(e.to_string()))?;

        let token = session
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                MediaServerError::AuthenticationFailed("response carried no access token".into())
            })?;
        let account_id = session
            .user
            .and_then(|u| u.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                MediaServerError::AuthenticationFailed("response carried no account id".into())
            })?;

        Ok(AuthContext::keyed_session(token, account_id))
    }

    /// Direct token probe: use the access key as a bearer token and pick an account.
    async fn probe_direct_token(&self) -> Result<AuthContext, MediaServerError> {
        let url = format!("{}/Users", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, bearer_header(&self.access_key))
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let accounts: Vec<RawAccount> = response
            .json()
            .await
            .map_err(|e| MediaServerError::ParseError(e.to_string()))?;

        let account_id = select_account(&accounts).ok_or_else(|| {
            MediaServerError::AuthenticationFailed("account list yielded no account id".into())
        })?;

        Ok(AuthContext::direct_token(account_id))
    }

    async fn account_id(&self) -> Result<String, MediaServerError> {
        Ok(self.authenticate().await?.account_id)
    }

    /// Number of items of the configured types below `library_id`.
    async fn count_items(&self, account_id: &str, library_id: &str) -> Result<u64, MediaServerError> {
        let query = [
            ("ParentId", library_id.to_string()),
            ("Recursive", "true".to_string()),
            ("IncludeItemTypes", self.item_types.join(",")),
            ("Limit", "0".to_string()),
        ];
        let path = format!("/Users/{}/Items", urlencoding::encode(account_id));
        let response: ItemsResponse = self.request_as("count_items", &path, &query).await?;
        response.total_record_count.ok_or_else(|| {
            MediaServerError::ParseError("count response carried no TotalRecordCount".to_string())
        })
    }
}

#[async_trait]
impl MediaLibrary for MediaServerClient {
    async fn list_libraries(&self) -> Result<Vec<LibraryView>, MediaServerError> {
        let account_id = self.account_id().await?;
        let path = format!("/Users/{}/Views", urlencoding::encode(&account_id));
        let views: ViewsResponse = self.request_as("list_views", &path, &[]).await?;

        let counts = join_all(
            views
                .items
                .iter()
                .map(|view| self.count_items(&account_id, &view.id)),
        )
        .await;

        let mut libraries = Vec::with_capacity(views.items.len());
        for (view, count) in views.items.into_iter().zip(counts) {
            let total_item_count = match count {
                Ok(n) => n,
                Err(e) => {
                    warn!(library_id = %view.id, error = %e, "Failed to count library items");
                    0
                }
            };
            libraries.push(LibraryView {
                name: view.name.unwrap_or_default(),
                id: view.id,
                total_item_count,
            });
        }

        Ok(libraries)
    }

    async fn get_page(
        &self,
        library_id: &str,
        offset: u64,
        page_size: u32,
    ) -> Result<ItemPage, MediaServerError> {
        let account_id = self.account_id().await?;
        let query = [
            ("ParentId", library_id.to_string()),
            ("Recursive", "true".to_string()),
            ("IncludeItemTypes", self.item_types.join(",")),
            ("StartIndex", offset.to_string()),
            ("Limit", page_size.to_string()),
            ("Fields", PAGE_FIELDS.to_string()),
            ("EnableImageTypes", "Primary,Backdrop".to_string()),
            ("SortBy", "SortName".to_string()),
            ("SortOrder", "Ascending".to_string()),
        ];
        let path = format!("/Users/{}/Items", urlencoding::encode(&account_id));
        let response: ItemsResponse = self.request_as("get_page", &path, &query).await?;

        debug!(
            library_id,
            offset,
            returned = response.items.len(),
            total = ?response.total_record_count,
            "Fetched library page"
        );

        Ok(ItemPage {
            items: response.items,
            total_count: response.total_record_count,
        })
    }
}

/// Among accounts with an id: administrator first, otherwise the first listed.
fn select_account(accounts: &[RawAccount]) -> Option<String> {
    let usable: Vec<&RawAccount> = accounts
        .iter()
        .filter(|a| a.id.as_deref().is_some_and(|id| !id.is_empty()))
        .collect();
    usable
        .iter()
        .find(|a| a.is_administrator())
        .or_else(|| usable.first())
        .and_then(|a| a.id.clone())
}

fn map_transport_error(e: reqwest::Error) -> MediaServerError {
    if e.is_timeout() {
        MediaServerError::Timeout
    } else if e.is_connect() {
        MediaServerError::ConnectionFailed(e.to_string())
    } else if e.is_decode() {
        MediaServerError::ParseError(e.to_string())
    } else {
        MediaServerError::ConnectionFailed(e.to_string())
    }
}

async fn api_error(response: Response) -> MediaServerError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    MediaServerError::Api {
        status,
        message: body.chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::media_server::AuthStrategy;
    use crate::sync::SyncCheckpoint;

    /// Behaviour and call log of the fake media server.
    struct FakeServer {
        session_status: StatusCode,
        users_status: StatusCode,
        accounts: Value,
        items_status: StatusCode,
        /// Leave `TotalRecordCount` out of item responses.
        omit_total: bool,
        /// Library id -> ordered items.
        libraries: Vec<(String, String, Vec<Value>)>,
        session_calls: AtomicUsize,
        users_calls: AtomicUsize,
        data_auth_headers: Mutex<Vec<String>>,
        last_query: Mutex<HashMap<String, String>>,
    }

    impl Default for FakeServer {
        fn default() -> Self {
            Self {
                session_status: StatusCode::OK,
                users_status: StatusCode::OK,
                accounts: json!([{ "Id": "acct-1", "Policy": { "IsAdministrator": false } }]),
                items_status: StatusCode::OK,
                omit_total: false,
                libraries: Vec::new(),
                session_calls: AtomicUsize::new(0),
                users_calls: AtomicUsize::new(0),
                data_auth_headers: Mutex::new(Vec::new()),
                last_query: Mutex::new(HashMap::new()),
            }
        }
    }

    impl FakeServer {
        fn record_auth(&self, headers: &HeaderMap) {
            let value = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            self.data_auth_headers.lock().unwrap().push(value);
        }
    }

    async fn sessions(State(fake): State<Arc<FakeServer>>) -> impl IntoResponse {
        fake.session_calls.fetch_add(1, Ordering::SeqCst);
        if fake.session_status.is_success() {
            (
                StatusCode::OK,
                Json(json!({ "AccessToken": "sess-token", "User": { "Id": "session-acct" } })),
            )
        } else {
            (fake.session_status, Json(json!({ "error": "nope" })))
        }
    }

    async fn users(State(fake): State<Arc<FakeServer>>) -> impl IntoResponse {
        fake.users_calls.fetch_add(1, Ordering::SeqCst);
        if fake.users_status.is_success() {
            (StatusCode::OK, Json(fake.accounts.clone()))
        } else {
            (fake.users_status, Json(json!({ "error": "denied" })))
        }
    }

    async fn views(
        State(fake): State<Arc<FakeServer>>,
        Path(_account): Path<String>,
        headers: HeaderMap,
    ) -> impl IntoResponse {
        fake.record_auth(&headers);
        let items: Vec<Value> = fake
            .libraries
            .iter()
            .map(|(id, name, _)| json!({ "Id": id, "Name": name }))
            .collect();
        Json(json!({ "Items": items }))
    }

    async fn items(
        State(fake): State<Arc<FakeServer>>,
        Path(_account): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> impl IntoResponse {
        fake.record_auth(&headers);
        *fake.last_query.lock().unwrap() = query.clone();

        if !fake.items_status.is_success() {
            return (fake.items_status, Json(json!({ "error": "items failed" })));
        }

        let parent = query.get("ParentId").cloned().unwrap_or_default();
        let Some((_, _, all)) = fake.libraries.iter().find(|(id, _, _)| *id == parent) else {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "unknown parent" })),
            );
        };

        let start: usize = query
            .get("StartIndex")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let limit: usize = query
            .get("Limit")
            .and_then(|s| s.parse().ok())
            .unwrap_or(all.len());
        let page: Vec<Value> = all.iter().skip(start).take(limit).cloned().collect();

        if fake.omit_total {
            return (StatusCode::OK, Json(json!({ "Items": page })));
        }
        (
            StatusCode::OK,
            Json(json!({ "Items": page, "TotalRecordCount": all.len() })),
        )
    }

    async fn spawn(fake: FakeServer) -> (String, Arc<FakeServer>) {
        let fake = Arc::new(fake);
        let app = Router::new()
            .route("/Sessions/ApiKey", post(sessions))
            .route("/Users", get(users))
            .route("/Users/{account}/Views", get(views))
            .route("/Users/{account}/Items", get(items))
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), fake)
    }

    fn client_for(url: &str) -> MediaServerClient {
        let settings = MediaServerSettings::new(url, "key-123");
        let config = MediaServerClientConfig {
            timeout_secs: 5,
            ..Default::default()
        };
        MediaServerClient::new(
            &settings,
            &config,
            vec!["Movie".to_string(), "Series".to_string()],
        )
        .unwrap()
    }

    fn movies(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({ "Id": format!("m{}", i), "Name": format!("Movie {}", i), "Type": "Movie" }))
            .collect()
    }

    #[tokio::test]
    async fn test_keyed_session_success() {
        let (url, fake) = spawn(FakeServer {
            libraries: vec![("lib-1".into(), "Movies".into(), movies(3))],
            ..Default::default()
        })
        .await;
        let client = client_for(&url);

        let session = client.authenticate().await.unwrap();
        assert_eq!(session.strategy, AuthStrategy::KeyedSession);
        assert_eq!(session.account_id, "session-acct");

        client.get_page("lib-1", 0, 10).await.unwrap();

        assert_eq!(fake.users_calls.load(Ordering::SeqCst), 0);
        let headers = fake.data_auth_headers.lock().unwrap().clone();
        assert_eq!(headers.len(), 1);
        assert!(headers[0].starts_with("MediaBrowser "));
        assert!(headers[0].contains("ApiKey=\"key-123\""));
        assert!(headers[0].contains("Token=\"sess-token\""));
    }

    #[tokio::test]
    async fn test_fallback_to_direct_token_once() {
        let (url, fake) = spawn(FakeServer {
            session_status: StatusCode::NOT_FOUND,
            libraries: vec![("lib-1".into(), "Movies".into(), movies(3))],
            ..Default::default()
        })
        .await;
        let client = client_for(&url);

        let session = client.authenticate().await.unwrap();
        assert_eq!(session.strategy, AuthStrategy::DirectToken);
        assert_eq!(session.account_id, "acct-1");

        client.get_page("lib-1", 0, 10).await.unwrap();
        client.get_page("lib-1", 0, 10).await.unwrap();
        client.authenticate().await.unwrap();

        assert_eq!(fake.session_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fake.users_calls.load(Ordering::SeqCst), 1);
        let headers = fake.data_auth_headers.lock().unwrap().clone();
        assert_eq!(headers, vec!["Bearer key-123", "Bearer key-123"]);
    }

    #[tokio::test]
    async fn test_both_strategies_fail_with_combined_reason() {
        let (url, fake) = spawn(FakeServer {
            session_status: StatusCode::INTERNAL_SERVER_ERROR,
            users_status: StatusCode::FORBIDDEN,
            ..Default::default()
        })
        .await;
        let client = client_for(&url);

        let err = client.authenticate().await.unwrap_err();
        let message = match err {
            MediaServerError::AuthenticationFailed(message) => message,
            other => panic!("expected AuthenticationFailed, got {:?}", other),
        };
        assert!(message.contains("keyed session"));
        assert!(message.contains("500"));
        assert!(message.contains("direct token"));
        assert!(message.contains("403"));
        assert!(fake.data_auth_headers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_direct_token_prefers_administrator() {
        let (url, _fake) = spawn(FakeServer {
            session_status: StatusCode::UNAUTHORIZED,
            accounts: json!([
                { "Id": "viewer", "Policy": { "IsAdministrator": false } },
                { "Id": "admin", "Policy": { "IsAdministrator": true } }
            ]),
            ..Default::default()
        })
        .await;

        let session = client_for(&url).authenticate().await.unwrap();
        assert_eq!(session.account_id, "admin");
    }

    #[tokio::test]
    async fn test_direct_token_without_accounts_fails() {
        let (url, _fake) = spawn(FakeServer {
            session_status: StatusCode::UNAUTHORIZED,
            accounts: json!([]),
            ..Default::default()
        })
        .await;

        let err = client_for(&url).authenticate().await.unwrap_err();
        assert!(err.to_string().contains("no account id"));
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_authentication() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .authenticate()
            .await
            .unwrap_err();
        assert!(matches!(err, MediaServerError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_get_page_forwards_cursor_and_projection() {
        let (url, fake) = spawn(FakeServer {
            libraries: vec![("lib-1".into(), "Movies".into(), movies(450))],
            ..Default::default()
        })
        .await;
        let client = client_for(&url);

        let page = client.get_page("lib-1", 400, 200).await.unwrap();
        assert_eq!(page.items.len(), 50);
        assert_eq!(page.total_count, Some(450));
        assert_eq!(page.items[0].id.as_deref(), Some("m400"));

        let query = fake.last_query.lock().unwrap().clone();
        assert_eq!(query.get("StartIndex").map(String::as_str), Some("400"));
        assert_eq!(query.get("Limit").map(String::as_str), Some("200"));
        assert_eq!(query.get("Recursive").map(String::as_str), Some("true"));
        assert_eq!(query.get("IncludeItemTypes").map(String::as_str), Some("Movie,Series"));
        assert_eq!(query.get("Fields").map(String::as_str), Some(PAGE_FIELDS));
    }

    #[tokio::test]
    async fn test_empty_page_is_not_an_error() {
        let (url, _fake) = spawn(FakeServer {
            libraries: vec![("empty".into(), "Nothing".into(), Vec::new())],
            ..Default::default()
        })
        .await;

        let page = client_for(&url).get_page("empty", 0, 200).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, Some(0));
    }

    #[tokio::test]
    async fn test_list_libraries_with_counts() {
        let (url, _fake) = spawn(FakeServer {
            libraries: vec![
                ("lib-1".into(), "Movies".into(), movies(12)),
                ("lib-2".into(), "Shows".into(), movies(3)),
            ],
            ..Default::default()
        })
        .await;

        let libraries = client_for(&url).list_libraries().await.unwrap();
        assert_eq!(
            libraries,
            vec![
                LibraryView {
                    id: "lib-1".into(),
                    name: "Movies".into(),
                    total_item_count: 12
                },
                LibraryView {
                    id: "lib-2".into(),
                    name: "Shows".into(),
                    total_item_count: 3
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_data_call() {
        let (url, _fake) = spawn(FakeServer {
            items_status: StatusCode::UNAUTHORIZED,
            libraries: vec![("lib-1".into(), "Movies".into(), movies(1))],
            ..Default::default()
        })
        .await;

        let err = client_for(&url).get_page("lib-1", 0, 10).await.unwrap_err();
        assert!(matches!(err, MediaServerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_failed_count_degrades_to_zero() {
        let (url, _fake) = spawn(FakeServer {
            items_status: StatusCode::BAD_GATEWAY,
            libraries: vec![("lib-1".into(), "Movies".into(), movies(5))],
            ..Default::default()
        })
        .await;

        let libraries = client_for(&url).list_libraries().await.unwrap();
        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries[0].total_item_count, 0);
    }

    #[tokio::test]
    async fn test_generic_request_is_authorized() {
        let (url, fake) = spawn(FakeServer {
            session_status: StatusCode::BAD_REQUEST,
            libraries: vec![("lib-1".into(), "Movies".into(), movies(1))],
            ..Default::default()
        })
        .await;

        let body: Value = client_for(&url)
            .request("/Users/acct-1/Views", &[])
            .await
            .unwrap();
        assert_eq!(body["Items"][0]["Name"], "Movies");
        assert_eq!(
            fake.data_auth_headers.lock().unwrap().clone(),
            vec!["Bearer key-123"]
        );
    }

    #[test]
    fn test_new_rejects_incomplete_settings() {
        let settings = MediaServerSettings::new("http://media.local", "");
        let result = MediaServerClient::new(
            &settings,
            &MediaServerClientConfig::default(),
            vec!["Movie".to_string()],
        );
        assert!(matches!(result, Err(MediaServerError::NotConfigured(_))));
    }

    #[test]
    fn test_select_account_falls_back_to_first() {
        let accounts: Vec<RawAccount> =
            serde_json::from_value(json!([{ "Id": "a" }, { "Id": "b" }])).unwrap();
        assert_eq!(select_account(&accounts).as_deref(), Some("a"));
    }

    #[test]
    fn test_select_account_skips_accounts_without_id() {
        let accounts: Vec<RawAccount> = serde_json::from_value(json!([
            { "Id": "viewer" },
            { "Policy": { "IsAdministrator": true } },
            { "Id": "", "Policy": { "IsAdministrator": true } }
        ]))
        .unwrap();
        assert_eq!(select_account(&accounts).as_deref(), Some("viewer"));

        let nameless: Vec<RawAccount> =
            serde_json::from_value(json!([{ "Policy": { "IsAdministrator": true } }])).unwrap();
        assert!(select_account(&nameless).is_none());
    }

    #[tokio::test]
    async fn test_direct_token_with_idless_administrator_uses_other_account() {
        let (url, _fake) = spawn(FakeServer {
            session_status: StatusCode::UNAUTHORIZED,
            accounts: json!([
                { "Id": "viewer", "Policy": { "IsAdministrator": false } },
                { "Policy": { "IsAdministrator": true } }
            ]),
            ..Default::default()
        })
        .await;

        let session = client_for(&url).authenticate().await.unwrap();
        assert_eq!(session.account_id, "viewer");
    }

    #[tokio::test]
    async fn test_full_page_without_total_keeps_library_open() {
        let (url, _fake) = spawn(FakeServer {
            omit_total: true,
            libraries: vec![("lib-1".into(), "Movies".into(), movies(250))],
            ..Default::default()
        })
        .await;
        let client = client_for(&url);

        let page = client.get_page("lib-1", 0, 200).await.unwrap();
        assert_eq!(page.items.len(), 200);
        assert_eq!(page.total_count, None);

        let cp = SyncCheckpoint::after_page("lib-1", 0, 200, 200, page.total_count);
        assert!(!cp.done);
        assert_eq!(cp.offset, 200);

        let last = client.get_page("lib-1", 200, 200).await.unwrap();
        let cp = SyncCheckpoint::after_page("lib-1", 200, last.items.len() as u64, 200, last.total_count);
        assert!(cp.done);
    }

    #[tokio::test]
    async fn test_count_without_total_degrades_to_zero() {
        let (url, _fake) = spawn(FakeServer {
            omit_total: true,
            libraries: vec![("lib-1".into(), "Movies".into(), movies(5))],
            ..Default::default()
        })
        .await;

        let libraries = client_for(&url).list_libraries().await.unwrap();
        assert_eq!(libraries[0].total_item_count, 0);
    }
}
