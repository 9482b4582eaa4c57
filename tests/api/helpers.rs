use chrono::{DateTime, Utc};
use reqwest::redirect::Policy;
use reqwest::Response;
use sqlx::{migrate, Connection, Executor, PgConnection, PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cloudspark_subscribers::config::{get_configuration, DatabaseSettings, Settings};
use cloudspark_subscribers::startup::{get_connection_db_pool, Application};

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub db_pool: PgPool,
    pub notification_server: MockServer,
}

pub struct StoredSubscriber {
    pub subscriber_id: String,
    pub email: String,
    pub given_name: String,
    pub status: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");
        let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));
        let notification_server = MockServer::start().await;

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        config.set_notification_base_url(notification_server.uri());

        let db_pool = configure_db(&mut config.database, db_test_name.clone()).await;

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            config: config.clone(),
            db_pool,
            notification_server,
        }
    }

    /// Makes every provider endpoint answer 200.
    pub async fn mount_provider_success(&self) {
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.notification_server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(r"^/profiles/.+$"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.notification_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path_regex(r"^/profiles/.+$"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.notification_server)
            .await;
    }

    pub async fn post_subscription(&self, body: HashMap<&str, &str>) -> Response {
        let client = reqwest::Client::new();
        let url = format!("{}/subscriptions", self.address);

        client
            .post(&url)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Registers a subscriber and returns the id assigned to it.
    pub async fn register_subscriber(&self, email: &str, given_name: &str) -> String {
        let mut body = HashMap::new();
        body.insert("email", email);
        body.insert("given_name", given_name);

        let response = self.post_subscription(body).await;

        assert_eq!(201, response.status().as_u16());

        let body: serde_json::Value = response
            .json()
            .await
            .expect("Failed to parse the registration response.");

        body["subscriber_id"]
            .as_str()
            .expect("Registration response is missing the subscriber id.")
            .to_string()
    }

    // Redirects are not followed: the tests assert on the redirect response
    // itself, and the target pages live on another host anyway.
    pub async fn get_transition(&self, subscriber_id: &str, transition: &str) -> Response {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();
        let url = format!(
            "{}/v1/subscribers/{}/{}",
            self.address, subscriber_id, transition
        );

        client
            .get(&url)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn fetch_subscriber(&self, email: &str) -> StoredSubscriber {
        let row = sqlx::query(
            "SELECT subscriber_id, email, given_name, status, created, updated FROM subscribers WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.db_pool)
        .await
        .expect("Query to fetch the subscriber failed.");

        StoredSubscriber {
            subscriber_id: row.get("subscriber_id"),
            email: row.get("email"),
            given_name: row.get("given_name"),
            status: row.get("status"),
            created: row.get("created"),
            updated: row.get("updated"),
        }
    }

    pub async fn count_subscribers(&self, email: &str) -> i64 {
        sqlx::query("SELECT COUNT(*) AS total FROM subscribers WHERE email = $1")
            .bind(email)
            .fetch_one(&self.db_pool)
            .await
            .expect("Query to count subscribers failed.")
            .get("total")
    }

    /// Requests the provider received for a given method + path.
    pub async fn provider_requests(&self, http_method: &str, url_path: &str) -> Vec<wiremock::Request> {
        self.notification_server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|request| {
                request.method.to_string() == http_method && request.url.path() == url_path
            })
            .collect()
    }

    /// `/send` requests the provider received for a given template key.
    pub async fn sent_templates(&self, template: &str) -> Vec<serde_json::Value> {
        self.provider_requests("POST", "/send")
            .await
            .into_iter()
            .filter_map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).ok())
            .filter(|body| body["message"]["template"] == template)
            .collect()
    }
}

async fn configure_db(db_config: &mut DatabaseSettings, db_test_name: String) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect_with(&db_config.get_db_options())
        .await
        .expect("Failed to connect to Postgres.");

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    // Execute migrations
    db_config.set_name(db_test_name);

    let db_pool = get_connection_db_pool(db_config);

    migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations.");

    db_pool
}
