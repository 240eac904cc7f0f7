use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gallery_wall::http::{serve, Gallery};
use gallery_wall::state::Library;
use gallery_wall::storage::{AnyObjectStore, CloudObjectStore, LocalObjectStore};
use gallery_wall::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gallery_wall=info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // The catalog must open; the server cannot function without it
    let library = Library::open(&config.database)?;
    let image_count = library.image_count().unwrap_or(0);
    info!("🎨 Gallery initialized with {} images", image_count);

    let objects = if config.uses_cloud_storage() {
        info!("☁️  Storing uploads on the image CDN ({})", config.cloud.cloud_name);
        AnyObjectStore::Cloud(CloudObjectStore::new(config.cloud.clone()))
    } else {
        warn!(
            "No CDN credentials configured, storing uploads in {}",
            config.media_dir.display()
        );
        AnyObjectStore::Local(LocalObjectStore::new(&config.media_dir, &config.public_url)?)
    };

    let gallery = Arc::new(Gallery::new(objects, library, &config.static_dir));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    serve(listener, gallery, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("could not listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await?;

    Ok(())
}
