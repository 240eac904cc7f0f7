/// HTTP module
///
/// - The gallery server: upload, listing, health and static files (server.rs)
/// - The outgoing client shared by the CDN store and the scene (client.rs)
/// - multipart/form-data bodies for outgoing uploads (multipart.rs)

pub mod client;
pub mod multipart;
pub mod server;

pub use client::HttpGalleryApi;
pub use server::{serve, Gallery};
