//! Studyhub - Study Group Collaboration Backend
//!
//! A backend for study groups and the social layer around them.
//!
//! ## Architecture
//!
//! - **Accounts**: registration, login, and a one-to-one profile per user
//! - **Groups**: study groups with an explicit membership set
//! - **Doubts**: questions asked inside a group, replies, solution marking
//! - **Friends**: directional friend requests and the derived friends list
//! - **Feed**: posts (optionally group-scoped), comments, reactions

use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = studyhub::Config::default();

    info!(
        database = config.database_url.as_str(),
        bind_address = config.bind_address.as_str(),
        "Starting Studyhub service"
    );

    let db = studyhub::Database::new(&config.database_url).await?;
    let state = studyhub::AppState::new(db);
    let app = studyhub::routes().with_state(state);

    info!("Listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
