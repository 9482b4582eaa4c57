use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::notification_client::NotificationClient;
use crate::routes::{
    handle_create_subscription, handle_delete, handle_subscribe, handle_unsubscribe, health_check,
};
use crate::store::SubscriberStore;

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);
        let notification_client = NotificationClient::new(
            config.get_notification_base_url(),
            config.get_notification_auth_token(),
            None,
        );

        let listener =
            TcpListener::bind(config.get_address()).expect("Failed to bind the address.");
        let port = listener.local_addr().unwrap().port();
        let server = run(listener, db_pool, notification_client)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    notification_client: NotificationClient,
) -> Result<Server, std::io::Error> {
    let store = web::Data::new(SubscriberStore::new(db_pool));
    let notification_client = web::Data::new(notification_client);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::post().to(handle_create_subscription))
            .route(
                "/v1/subscribers/{subscriber_id}/subscribe",
                web::get().to(handle_subscribe),
            )
            .route(
                "/v1/subscribers/{subscriber_id}/unsubscribe",
                web::get().to(handle_unsubscribe),
            )
            .route(
                "/v1/subscribers/{subscriber_id}/delete",
                web::get().to(handle_delete),
            )
            .app_data(store.clone())
            .app_data(notification_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
