/// Scene module
///
/// The client side of the gallery wall, independent of any particular renderer:
/// - Display objects and their image faces (display.rs)
/// - Where new objects appear (placement.rs)
/// - The camera and how far it may travel (viewpoint.rs)
/// - The gallery endpoints as the scene sees them (api.rs)
/// - Reconciling listings and drops with the live objects (manager.rs)
/// - Per-frame animation and submission (render_loop.rs)
///
/// A host wires it up roughly like this:
/// seed the `SceneState` once, spawn each `PendingUpload` returned by a drop,
/// and on every display frame call `apply_events` followed by `RenderLoop::frame`.

pub mod api;
pub mod display;
pub mod manager;
pub mod placement;
pub mod render_loop;
pub mod viewpoint;

pub use api::{ApiError, GalleryApi};
pub use display::{DisplayObject, ImageFace, ImageSource, ObjectId, PlacementMode, Transform};
pub use manager::{DroppedImage, PendingUpload, SceneEvent, SceneState, SeedSource};
pub use render_loop::{FrameSink, FrameStats, RenderLoop};
pub use viewpoint::{TravelRange, Viewpoint};
