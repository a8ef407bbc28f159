/// A point fixed in its cluster's local frame, plus the attributes the
/// projector writes for the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    local: [f64; 3],
    pub(crate) screen_position: [f64; 2],
    pub(crate) scale: f64,
    pub(crate) alpha: f64,
}

impl Node {
    pub fn new(local: [f64; 3]) -> Self {
        Node {
            local,
            screen_position: [0.0, 0.0],
            scale: 1.0,
            alpha: 1.0,
        }
    }

    /// Offset from the cluster centre, before rotation
    pub fn local(&self) -> [f64; 3] {
        self.local
    }

    pub fn screen_position(&self) -> [f64; 2] {
        self.screen_position
    }

    /// Perspective scale from the last projection
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// False when the last projection put the node behind the camera
    pub fn is_visible(&self) -> bool {
        self.scale > 0.0
    }

    pub(crate) fn hide(&mut self) {
        self.scale = 0.0;
        self.alpha = 0.0;
    }
}
