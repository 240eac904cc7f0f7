use cgmath::{Euler, Rad, Vector3, Zero};

/// Stable handle of a display object for the lifetime of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Where the pixels of a face come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Local preview reference (blob URL, file path) usable before any upload finished
    Local(String),
    /// Permanent public URL from the gallery server
    Remote(String),
}

impl ImageSource {
    /// The reference a renderer should load
    pub fn reference(&self) -> &str {
        match self {
            ImageSource::Local(reference) | ImageSource::Remote(reference) => reference,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ImageSource::Local(_))
    }
}

/// One side of the thin image cube
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFace {
    pub source: ImageSource,
    /// Flipped horizontally, so the image reads correctly from behind
    pub mirrored: bool,
}

/// How an object's initial position was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Scattered through the ellipsoidal cloud around the origin
    RandomEllipsoid,
    /// Straight ahead of the viewpoint at drop time
    InFrontOfCamera,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
}

impl Transform {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: Euler::new(Rad::zero(), Rad::zero(), Rad::zero()),
        }
    }

    /// Depth coordinate (distance along Z)
    pub fn depth(&self) -> f32 {
        self.position.z
    }
}

/// One visible image in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayObject {
    id: ObjectId,
    pub transform: Transform,
    front: ImageFace,
    back: ImageFace,
    placement: PlacementMode,
}

impl DisplayObject {
    pub(crate) fn new(
        id: ObjectId,
        position: Vector3<f32>,
        source: ImageSource,
        placement: PlacementMode,
    ) -> Self {
        let (front, back) = faces_for(source);
        Self {
            id,
            transform: Transform::at(position),
            front,
            back,
            placement,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn front(&self) -> &ImageFace {
        &self.front
    }

    pub fn back(&self) -> &ImageFace {
        &self.back
    }

    pub fn placement(&self) -> PlacementMode {
        self.placement
    }

    /// Swap both faces to a new source in place. Identity and transform are untouched.
    pub(crate) fn set_source(&mut self, source: ImageSource) {
        let (front, back) = faces_for(source);
        self.front = front;
        self.back = back;
    }
}

/// The front shows the image as-is, the back mirrored
fn faces_for(source: ImageSource) -> (ImageFace, ImageFace) {
    (
        ImageFace {
            source: source.clone(),
            mirrored: false,
        },
        ImageFace {
            source,
            mirrored: true,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;

    #[test]
    fn test_new_object_has_mirrored_back() {
        let obj = DisplayObject::new(
            ObjectId(1),
            vec3(1.0, 2.0, -3.0),
            ImageSource::Local("blob:abc".into()),
            PlacementMode::InFrontOfCamera,
        );

        assert_eq!(obj.front().source, ImageSource::Local("blob:abc".into()));
        assert!(!obj.front().mirrored);
        assert_eq!(obj.back().source, obj.front().source);
        assert!(obj.back().mirrored);
        assert_eq!(obj.transform.depth(), -3.0);
    }

    #[test]
    fn test_set_source_keeps_transform() {
        let mut obj = DisplayObject::new(
            ObjectId(9),
            vec3(0.5, -0.25, 1.0),
            ImageSource::Local("file:///tmp/a.png".into()),
            PlacementMode::InFrontOfCamera,
        );
        obj.transform.rotation.y = Rad(0.3);
        let before = obj.transform;

        obj.set_source(ImageSource::Remote("https://cdn.example/a.png".into()));

        assert_eq!(obj.id(), ObjectId(9));
        assert_eq!(obj.transform, before);
        assert_eq!(obj.front().source.reference(), "https://cdn.example/a.png");
        assert!(!obj.back().source.is_local());
        assert!(obj.back().mirrored);
    }
}
