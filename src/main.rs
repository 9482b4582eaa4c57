use cloudspark_subscribers::config::get_configuration;
use cloudspark_subscribers::startup::Application;
use cloudspark_subscribers::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(
        String::from("cloudspark_subscribers"),
        String::from("info"),
    );

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config).await?;

    tracing::info!("Server listening on port {}", application.get_port());

    application.run_until_stop().await
}
