#![allow(dead_code)]

use std::sync::Arc;

use admin_service::config::default_public_paths;
use admin_service::config::SessionConfig;
use admin_service::domain::principal::models::EmailAddress;
use admin_service::domain::principal::models::PrincipalId;
use admin_service::domain::principal::models::SeedPrincipalCommand;
use admin_service::domain::principal::models::SessionMode;
use admin_service::domain::principal::models::Username;
use admin_service::domain::principal::models::ADMIN_ROLE;
use admin_service::domain::principal::service::SessionService;
use admin_service::inbound::http::router::create_router;
use admin_service::inbound::http::router::SessionSettings;
use admin_service::outbound::repositories::InMemoryPrincipalRepository;
use auth::AuthSettings;
use auth::Authenticator;
use auth::Claims;
use auth::Identity;
use auth::JwtHandler;
use chrono::Duration;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::header::SET_COOKIE;

pub const SIGNING_KEY: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ISSUER: &str = "bacha";
pub const AUDIENCE: &str = "bacha-clients";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@bacha.local";
pub const ADMIN_PASSWORD: &str = "123";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub repository: Arc<InMemoryPrincipalRepository>,
    pub admin_id: PrincipalId,
}

impl TestApp {
    /// Spawn the application in bearer mode
    pub async fn spawn() -> Self {
        Self::spawn_with_mode(SessionMode::Bearer).await
    }

    /// Spawn the application in a background task with a seeded administrator
    pub async fn spawn_with_mode(mode: SessionMode) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Arc::new(
            Authenticator::new(AuthSettings {
                signing_key: SIGNING_KEY.to_string(),
                issuer: ISSUER.to_string(),
                audience: AUDIENCE.to_string(),
                access_token_ttl: Duration::minutes(60),
                refresh_token_ttl: Duration::days(7),
            })
            .expect("Failed to create authenticator"),
        );

        let repository = Arc::new(InMemoryPrincipalRepository::new());
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
            mode,
        ));

        let admin_id = PrincipalId::new();
        session_service
            .seed_principal(SeedPrincipalCommand {
                id: Some(admin_id),
                username: Username::new(ADMIN_USERNAME.to_string()).unwrap(),
                email: EmailAddress::new(ADMIN_EMAIL.to_string()).unwrap(),
                full_name: "System Administrator".to_string(),
                password: ADMIN_PASSWORD.to_string(),
                role: ADMIN_ROLE.to_string(),
            })
            .await
            .expect("Failed to seed administrator");

        let session_config = SessionConfig {
            mode,
            login_path: "/auth/login".to_string(),
            public_paths: default_public_paths(),
            secure_cookies: false,
        };
        let session = SessionSettings::new(&session_config, authenticator.refresh_token_ttl());
        let router = create_router(session_service, authenticator, session);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create reqwest client"),
            jwt_handler: JwtHandler::new(SIGNING_KEY.as_bytes(), ISSUER, AUDIENCE),
            repository,
            admin_id,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make script-style (AJAX) GET request
    pub fn get_ajax(&self, path: &str) -> reqwest::RequestBuilder {
        self.get(path).header("X-Requested-With", "XMLHttpRequest")
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Log in and return the response
    pub async fn login(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login")
            .json(&serde_json::json!({
                "usernameOrEmail": identifier,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in as the seeded administrator and return the parsed body
    pub async fn login_admin(&self) -> serde_json::Value {
        let response = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }

    /// Register a principal and return the response
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "fullName": "Test User",
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Access token for the administrator that expired an hour ago
    pub fn expired_admin_token(&self) -> String {
        let identity = Identity {
            subject: self.admin_id.to_string(),
            name: ADMIN_USERNAME.to_string(),
            email: ADMIN_EMAIL.to_string(),
            role: ADMIN_ROLE.to_string(),
        };
        let claims = Claims::for_identity(
            &identity,
            ISSUER,
            AUDIENCE,
            Utc::now() - Duration::hours(2),
            Duration::hours(1),
        );
        self.jwt_handler.encode(&claims).expect("Failed to encode token")
    }
}

/// Every `Set-Cookie` header of a response
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `Set-Cookie` header written for `name`
pub fn set_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(headers)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
}

/// Value written for cookie `name`
pub fn set_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    set_cookie(headers, name).map(|c| {
        c[name.len() + 1..]
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string()
    })
}

/// Whether the response clears cookie `name`
pub fn clears_cookie(headers: &HeaderMap, name: &str) -> bool {
    set_cookie(headers, name).is_some_and(|c| {
        c.starts_with(&format!("{}=;", name)) && c.contains("Max-Age=0")
    })
}
