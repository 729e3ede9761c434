use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use trawl_db::{Database, DatabaseConfig};

/// Spins up a PostgreSQL container and returns a migrated [`Database`].
///
/// The `ContainerAsync` must be kept in scope for the test duration.
/// Dropping it stops the container.
pub async fn setup_test_db() -> (Database, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "trawl_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/trawl_test");
    let db = Database::new(DatabaseConfig::from_url(&connection_string).unwrap());

    // Postgres restarts once after init, so retry until it stays up.
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    loop {
        match db.migrate().await {
            Ok(()) => break,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to migrate database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    }

    (db, container)
}
