//! Remote data gateway for the Parrot Wings API
//!
//! One request per call: no retries, batching or caching. Callers decide
//! what to refresh after a mutation.

pub mod error;

use async_trait::async_trait;
use parrotweb_core::{AuthData, AuthMode, Transaction, TransactionData, User, UserOption};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub use error::{GatewayError, GatewayErrorCode, GatewayResult, GENERIC_MESSAGE};

/// Calls the front-end makes against the remote API
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Log in or register; returns the bearer token
    async fn authenticate(&self, data: &AuthData, mode: AuthMode) -> GatewayResult<String>;

    async fn fetch_user_info(&self, token: &str) -> GatewayResult<User>;

    async fn fetch_transactions(&self, token: &str) -> GatewayResult<Vec<Transaction>>;

    /// Transfer `data.amount` to `data.name`. The response body is ignored.
    async fn create_transaction(&self, token: &str, data: &TransactionData) -> GatewayResult<()>;

    /// Counterparty suggestions for a name prefix
    async fn list_users(&self, token: &str, filter: &str) -> GatewayResult<Vec<UserOption>>;
}

/// Gateway reference type
pub type GatewayRef = Arc<dyn RemoteGateway>;

// ==================== Wire envelopes ====================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user_info_token: User,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    trans_token: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
struct UserFilter<'a> {
    filter: &'a str,
}

// ==================== HTTP implementation ====================

pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Body of a 2xx response; anything else becomes an error carrying the body text
    async fn read_body(response: Response) -> GatewayResult<String> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            log::warn!("Remote API rejected token ({})", status);
            return Err(GatewayError::Unauthorized { message: text });
        }
        if !status.is_success() {
            log::warn!("Remote API returned {}: {}", status, text);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(text)
    }

    fn decode<T: DeserializeOwned>(text: &str) -> GatewayResult<T> {
        serde_json::from_str(text).map_err(|e| GatewayError::Decode { message: e.to_string() })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> GatewayResult<T> {
        let url = self.url(path);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let text = Self::read_body(response).await?;
        Self::decode(&text)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, token: Option<&str>, body: &B) -> GatewayResult<String> {
        let url = self.url(path);
        log::debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::read_body(response).await
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn authenticate(&self, data: &AuthData, mode: AuthMode) -> GatewayResult<String> {
        let path = match mode {
            AuthMode::Register => "/users",
            AuthMode::Login => "/sessions/create",
        };
        let text = self.post(path, None, data).await?;
        let response: TokenResponse = Self::decode(&text)?;
        log::info!("Authenticated via {}", mode);
        Ok(response.id_token)
    }

    async fn fetch_user_info(&self, token: &str) -> GatewayResult<User> {
        let response: UserInfoResponse = self.get("/api/protected/user-info", token).await?;
        Ok(response.user_info_token)
    }

    async fn fetch_transactions(&self, token: &str) -> GatewayResult<Vec<Transaction>> {
        let response: TransactionsResponse = self.get("/api/protected/transactions", token).await?;
        log::debug!("Fetched {} transactions", response.trans_token.len());
        Ok(response.trans_token)
    }

    async fn create_transaction(&self, token: &str, data: &TransactionData) -> GatewayResult<()> {
        self.post("/api/protected/transactions", Some(token), data).await?;
        log::info!("Created transaction to {} for {}", data.name, data.amount);
        Ok(())
    }

    async fn list_users(&self, token: &str, filter: &str) -> GatewayResult<Vec<UserOption>> {
        let text = self
            .post("/api/protected/users/list", Some(token), &UserFilter { filter })
            .await?;
        Self::decode(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parrotweb_core::{MemoryTokenStore, Session};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn credentials(username: Option<&str>) -> AuthData {
        AuthData {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
            username: username.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_login_posts_to_sessions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/create"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id_token": "tok"})))
            .mount(&server)
            .await;

        let token = gateway(&server)
            .authenticate(&credentials(None), AuthMode::Login)
            .await
            .unwrap();
        assert_eq!(token, "tok");
    }

    #[tokio::test]
    async fn test_error_body_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions/create"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid email or password."))
            .mount(&server)
            .await;

        let error = gateway(&server)
            .authenticate(&credentials(None), AuthMode::Login)
            .await
            .unwrap_err();
        assert!(matches!(error, GatewayError::Api { status: 400, .. }));
        assert_eq!(error.display_message(), "Invalid email or password.");
    }

    #[tokio::test]
    async fn test_missing_token_field_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&server)
            .await;

        let error = gateway(&server)
            .authenticate(&credentials(Some("alice")), AuthMode::Register)
            .await
            .unwrap_err();
        assert_eq!(error.code(), GatewayErrorCode::Decode);
        assert_eq!(error.display_message(), GENERIC_MESSAGE);
    }

    #[tokio::test]
    async fn test_unauthorized_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/protected/transactions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Session expired"))
            .mount(&server)
            .await;

        let error = gateway(&server).fetch_transactions("stale").await.unwrap_err();
        assert!(error.is_unauthorized());
        assert_eq!(error.display_message(), "Session expired");
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic() {
        let gateway = HttpGateway::new("http://127.0.0.1:1/", Duration::from_secs(2)).unwrap();
        assert_eq!(gateway.base_url(), "http://127.0.0.1:1");

        let error = gateway.fetch_user_info("tok").await.unwrap_err();
        assert_eq!(error.code(), GatewayErrorCode::Transport);
        assert_eq!(error.display_message(), GENERIC_MESSAGE);
    }

    #[tokio::test]
    async fn test_list_users() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/protected/users/list"))
            .and(header("Authorization", "Bearer tok"))
            .and(body_json(json!({"filter": "ca"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 2, "name": "carol"},
                {"id": 5, "name": "cassie"}
            ])))
            .mount(&server)
            .await;

        let users = gateway(&server).list_users("tok", "ca").await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "carol");
    }

    #[tokio::test]
    async fn test_register_create_and_refresh() {
        let server = MockServer::start().await;
        let gateway = gateway(&server);
        let session = Session::new(Arc::new(MemoryTokenStore::new()));

        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(json!({"email": "a@b.com", "password": "secret1", "username": "alice"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id_token": "tok"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/protected/user-info"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_info_token": {"id": 1, "name": "alice", "email": "a@b.com", "balance": 500}
            })))
            .mount(&server)
            .await;

        let token = gateway
            .authenticate(&credentials(Some("alice")), AuthMode::Register)
            .await
            .unwrap();
        session.set_token(&token).unwrap();

        let token = session.require_token().unwrap();
        let user = gateway.fetch_user_info(&token).await.unwrap();
        assert_eq!(user.balance, 500);

        Mock::given(method("POST"))
            .and(path("/api/protected/transactions"))
            .and(header("Authorization", "Bearer tok"))
            .and(body_json(json!({"name": "carol", "amount": 20})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let data = TransactionData {
            name: "carol".to_string(),
            amount: 20,
        };
        gateway.create_transaction(&token, &data).await.unwrap();

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/api/protected/user-info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_info_token": {"id": 1, "name": "alice", "email": "a@b.com", "balance": 480}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/protected/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "trans_token": [
                    {"id": 1, "date": "2020-05-01T10:00:00.000Z", "username": "carol", "amount": -20, "balance": 480}
                ]
            })))
            .mount(&server)
            .await;

        let (user, transactions) = tokio::join!(
            gateway.fetch_user_info(&token),
            gateway.fetch_transactions(&token)
        );
        assert_eq!(user.unwrap().balance, 480);
        let transactions = transactions.unwrap();
        assert_eq!(transactions.len(), 1);
        assert!(transactions[0].is_debit());
        assert_eq!(transactions[0].username, "carol");
    }
}
