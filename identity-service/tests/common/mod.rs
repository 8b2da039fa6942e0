use std::sync::Arc;
use std::sync::Mutex;

use auth::Authenticator;
use auth::Clock;
use auth::SessionSettings;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use identity_service::config::CorsConfig;
use identity_service::domain::user::service::AuthService;
use identity_service::inbound::http::cookies::CookiePolicy;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryCredentialStore;
use serde_json::json;

pub const ACCESS_SECRET: &str = "integration-access-secret-32-bytes-min!";
pub const REFRESH_SECRET: &str = "integration-refresh-secret-32-bytes-min";

/// Clock shared by the server and the test, moved forward by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Test application that spawns a real server backed by the in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub store: InMemoryCredentialStore,
    pub clock: Arc<ManualClock>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = Arc::new(ManualClock::new());
        let authenticator = Arc::new(Authenticator::with_clock(
            &SessionSettings::new(ACCESS_SECRET, REFRESH_SECRET),
            clock.clone(),
        ));
        let store = InMemoryCredentialStore::new();

        let auth_service = Arc::new(
            AuthService::new(Arc::new(store.clone()), Arc::clone(&authenticator))
                .with_clock(clock.clone()),
        );

        let router = create_router(
            auth_service,
            CookiePolicy::new(false),
            &CorsConfig::default(),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: Self::client(),
            store,
            clock,
            authenticator,
        }
    }

    /// Fresh client with its own cookie store
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create reqwest client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make PATCH request
    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.patch(self.url(path))
    }

    /// Register a user and return the response body
    pub async fn register(&self, email: &str, password: &str, role: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "password": password,
                "first_name": "Ana",
                "last_name": "Gomez",
                "role": role,
                "favourite_genres": ["Drama", "Comedy"]
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in with the shared client so its cookie store holds the pair
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Value of the named cookie set by `response`
pub fn set_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
