use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::api::{ApiError, GalleryApi};
use super::display::{DisplayObject, ImageSource, ObjectId, PlacementMode};
use super::placement::{in_front_of, EllipsoidPlacement, DROP_DISTANCE};
use super::viewpoint::{TravelRange, Viewpoint};
use crate::state::{ImageRecord, UploadReceipt};
use crate::storage::ImageUpload;

/// Where the startup images come from
#[derive(Debug)]
pub enum SeedSource<'a, A> {
    /// A fixed list of image URLs bundled with the page
    StaticAssets(Vec<String>),
    /// The server's listing endpoint
    RemoteListing(&'a A),
}

/// An image file dropped onto the scene
#[derive(Debug, Clone)]
pub struct DroppedImage {
    /// The file itself, sent to the upload endpoint
    pub upload: ImageUpload,
    /// Local reference the renderer can show right away (blob URL, file path)
    pub preview: String,
}

/// Completions flowing back from background work
#[derive(Debug)]
pub enum SceneEvent {
    UploadFinished {
        object: ObjectId,
        result: Result<UploadReceipt, ApiError>,
    },
}

/// Owns every display object and the viewpoint.
///
/// Objects are only ever added; the collection is read through accessors.
/// Background uploads report back through a channel drained by [`SceneState::apply_events`],
/// so the host decides on which frame their results land.
pub struct SceneState {
    objects: Vec<DisplayObject>,
    next_id: u64,
    viewpoint: Viewpoint,
    placement: EllipsoidPlacement,
    rng: StdRng,
    events_tx: flume::Sender<SceneEvent>,
    events_rx: flume::Receiver<SceneEvent>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Scene with a caller-provided RNG (deterministic placement)
    pub fn with_rng(rng: StdRng) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        Self {
            objects: Vec::new(),
            next_id: 1,
            viewpoint: Viewpoint::default(),
            placement: EllipsoidPlacement::default(),
            rng,
            events_tx,
            events_rx,
        }
    }

    pub fn with_placement(mut self, placement: EllipsoidPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn objects(&self) -> &[DisplayObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&DisplayObject> {
        self.objects.iter().find(|obj| obj.id() == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn viewpoint(&self) -> &Viewpoint {
        &self.viewpoint
    }

    pub fn placement(&self) -> &EllipsoidPlacement {
        &self.placement
    }

    /// Mutable access for the render loop's per-frame animation
    pub(crate) fn animation_parts(&mut self) -> (&mut [DisplayObject], &mut Viewpoint) {
        (&mut self.objects, &mut self.viewpoint)
    }

    fn spawn(&mut self, source: ImageSource, placement: PlacementMode) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let position = match placement {
            PlacementMode::RandomEllipsoid => self.placement.sample(&mut self.rng),
            PlacementMode::InFrontOfCamera => in_front_of(&self.viewpoint, DROP_DISTANCE),
        };

        self.objects
            .push(DisplayObject::new(id, position, source, placement));
        id
    }

    /// One object per record, in the order given
    pub fn seed_from_records(&mut self, records: &[ImageRecord]) -> Vec<ObjectId> {
        records
            .iter()
            .map(|record| {
                self.spawn(
                    ImageSource::Remote(record.url.clone()),
                    PlacementMode::RandomEllipsoid,
                )
            })
            .collect()
    }

    /// One object per bundled asset URL, in the order given
    pub fn seed_from_assets(&mut self, assets: &[String]) -> Vec<ObjectId> {
        assets
            .iter()
            .map(|url| {
                self.spawn(
                    ImageSource::Remote(url.clone()),
                    PlacementMode::RandomEllipsoid,
                )
            })
            .collect()
    }

    /// Populate the scene at startup from whichever source the host configured
    pub async fn seed<A: GalleryApi>(&mut self, source: SeedSource<'_, A>) -> Vec<ObjectId> {
        match source {
            SeedSource::StaticAssets(assets) => self.seed_from_assets(&assets),
            SeedSource::RemoteListing(api) => self.seed_from_listing(api).await,
        }
    }

    /// The listing is fetched once. If it fails the scene simply starts without
    /// persisted images; dropping new ones still works.
    pub async fn seed_from_listing<A: GalleryApi>(&mut self, api: &A) -> Vec<ObjectId> {
        match api.list_images().await {
            Ok(records) => {
                info!("🖼️  Loaded {} images from the gallery", records.len());
                self.seed_from_records(&records)
            }
            Err(e) => {
                warn!("Gallery listing unavailable, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Show a dropped image immediately, in front of the viewpoint, using its local preview.
    ///
    /// Files whose declared type is not an image are ignored and return `None`.
    /// The returned upload has not started; the host runs it in the background.
    pub fn drop_image(&mut self, dropped: DroppedImage) -> Option<PendingUpload> {
        if !dropped.upload.is_image() {
            debug!(
                "Ignoring dropped {} ({})",
                dropped.upload.original_name, dropped.upload.content_type
            );
            return None;
        }

        let object = self.spawn(
            ImageSource::Local(dropped.preview),
            PlacementMode::InFrontOfCamera,
        );
        debug!("Dropped {} as {:?}", dropped.upload.original_name, object);

        Some(PendingUpload {
            object,
            upload: dropped.upload,
            events: self.events_tx.clone(),
        })
    }

    /// Apply every completion received so far. Returns how many were applied.
    pub fn apply_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                SceneEvent::UploadFinished { object, result } => {
                    self.finish_upload(object, result)
                }
            }
            applied += 1;
        }
        applied
    }

    /// On success the object's faces switch to the permanent URL; its transform stays put.
    /// On failure the local preview stays, forever. Only a log line records it.
    pub fn finish_upload(&mut self, object: ObjectId, result: Result<UploadReceipt, ApiError>) {
        let Some(target) = self.objects.iter_mut().find(|obj| obj.id() == object) else {
            debug!("Upload finished for unknown object {:?}", object);
            return;
        };

        match result {
            Ok(receipt) => {
                debug!("Upload for {:?} stored as record {}", object, receipt.id);
                target.set_source(ImageSource::Remote(receipt.image_url));
            }
            Err(e) => warn!("Upload failed, keeping local preview for {:?}: {}", object, e),
        }
    }

    /// Depths the viewpoint may currently travel between, from the live objects
    pub fn travel_range(&self) -> TravelRange {
        TravelRange::from_depths(
            self.viewpoint.initial_depth(),
            self.objects.iter().map(|obj| obj.transform.depth()),
        )
    }

    /// Wheel movement. The range is recomputed on every event so fresh drops extend it.
    pub fn on_wheel(&mut self, delta: f32) -> TravelRange {
        let range = self.travel_range();
        self.viewpoint.zoom(delta, range);
        range
    }

    /// Mouse-look movement (radians)
    pub fn on_look(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.viewpoint.turn(delta_yaw, delta_pitch);
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.viewpoint.resize(width, height);
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

/// An upload that has been announced to the scene but not sent yet
pub struct PendingUpload {
    object: ObjectId,
    upload: ImageUpload,
    events: flume::Sender<SceneEvent>,
}

impl PendingUpload {
    /// The display object waiting on this upload
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Send the file and post the outcome back to the scene. No retries, no timeout.
    pub async fn run<A: GalleryApi>(self, api: &A) {
        let result = api.upload_image(self.upload).await;
        // The scene may be gone (page closed); nobody is left to care
        let _ = self.events.send(SceneEvent::UploadFinished {
            object: self.object,
            result,
        });
    }
}
