use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use todo_server::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path = std::env::var("TODO_DB").unwrap_or_else(|_| "todos.db".to_string());
    let store = SqliteStore::open(&db_path)?;

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, db = %db_path, "listening");
    todo_server::run(listener, store).await?;
    Ok(())
}
