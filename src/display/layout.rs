//! Display identifiers, bounds, and the validated display map.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Display geometry error types
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Invalid display dimensions
    #[error("invalid dimensions {width}x{height} for display {id}")]
    InvalidDimensions {
        /// Offending display
        id: ScreenId,
        /// Reported width
        width: u32,
        /// Reported height
        height: u32,
    },

    /// Two display rectangles overlap
    #[error("displays {first} and {second} overlap")]
    Overlap {
        /// First display of the overlapping pair
        first: ScreenId,
        /// Second display of the overlapping pair
        second: ScreenId,
    },

    /// Duplicate display identifier
    #[error("duplicate display id {0}")]
    Duplicate(ScreenId),

    /// More displays than the configured maximum
    #[error("{count} displays exceeds the configured maximum of {max}")]
    TooManyDisplays {
        /// Number of displays supplied
        count: usize,
        /// Configured cap
        max: usize,
    },
}

/// Stable identifier of a shared display within a session.
///
/// Opaque to the rest of the system; ordering is only used to make map
/// iteration deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(pub u32);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen-{}", self.0)
    }
}

/// Pixel rectangle of one display in the unified coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayBounds {
    /// Display identifier
    pub id: ScreenId,

    /// X position in the unified space (pixels)
    pub x: i32,
    /// Y position in the unified space (pixels)
    pub y: i32,

    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,

    /// DPI scale factor for HiDPI displays
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

fn default_scale_factor() -> f64 {
    1.0
}

impl DisplayBounds {
    /// Create bounds with a 1.0 scale factor
    pub fn new(id: ScreenId, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            scale_factor: 1.0,
        }
    }

    /// Half-open containment check: `[x, x+w) × [y, y+h)`.
    ///
    /// A point exactly on the right or bottom edge belongs to the
    /// neighbouring display, not this one.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && px < (self.x as i64 + self.width as i64) as f64
            && py >= self.y as f64
            && py < (self.y as i64 + self.height as i64) as f64
    }

    /// Euclidean distance from a point to this rectangle (0 inside).
    pub fn distance_to(&self, px: f64, py: f64) -> f64 {
        let right = (self.x as i64 + self.width as i64) as f64;
        let bottom = (self.y as i64 + self.height as i64) as f64;

        let dx = if px < self.x as f64 {
            self.x as f64 - px
        } else if px > right {
            px - right
        } else {
            0.0
        };
        let dy = if py < self.y as f64 {
            self.y as f64 - py
        } else if py > bottom {
            py - bottom
        } else {
            0.0
        };

        (dx * dx + dy * dy).sqrt()
    }

    /// Proximity score used when no display contains the point.
    ///
    /// Monotonically decreasing in distance, 1.0 inside the rectangle.
    pub fn proximity_to(&self, px: f64, py: f64) -> f64 {
        1.0 / (1.0 + self.distance_to(px, py))
    }

    fn overlaps(&self, other: &DisplayBounds) -> bool {
        let a_right = self.x as i64 + self.width as i64;
        let a_bottom = self.y as i64 + self.height as i64;
        let b_right = other.x as i64 + other.width as i64;
        let b_bottom = other.y as i64 + other.height as i64;

        (self.x as i64) < b_right
            && (other.x as i64) < a_right
            && (self.y as i64) < b_bottom
            && (other.y as i64) < a_bottom
    }
}

/// Validated, immutable set of display bounds for one session.
///
/// Iteration order is deterministic (sorted by [`ScreenId`]), which makes
/// proximity tie-breaking reproducible. The map is cheap to clone behind
/// an `Arc` and is replaced wholesale on reconfiguration, never
/// mutated in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayMap {
    displays: Vec<DisplayBounds>,
}

impl DisplayMap {
    /// Build a validated map from raw bounds.
    ///
    /// Rejects zero-area displays, duplicate ids, and overlapping
    /// rectangles. An empty set is valid: attribution simply resolves
    /// nothing until displays arrive.
    pub fn new(mut displays: Vec<DisplayBounds>) -> Result<Self, DisplayError> {
        for d in &displays {
            if d.width == 0 || d.height == 0 {
                return Err(DisplayError::InvalidDimensions {
                    id: d.id,
                    width: d.width,
                    height: d.height,
                });
            }
        }

        displays.sort_by_key(|d| d.id);
        for pair in displays.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(DisplayError::Duplicate(pair[0].id));
            }
        }

        for i in 0..displays.len() {
            for j in (i + 1)..displays.len() {
                if displays[i].overlaps(&displays[j]) {
                    return Err(DisplayError::Overlap {
                        first: displays[i].id,
                        second: displays[j].id,
                    });
                }
            }
        }

        debug!(count = displays.len(), "display map validated");
        Ok(Self { displays })
    }

    /// Number of displays in the map
    pub fn len(&self) -> usize {
        self.displays.len()
    }

    /// Whether the map contains no displays
    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// Whether the given id is known to this map
    pub fn contains(&self, id: ScreenId) -> bool {
        self.displays.iter().any(|d| d.id == id)
    }

    /// First display in deterministic order, if any
    pub fn first(&self) -> Option<ScreenId> {
        self.displays.first().map(|d| d.id)
    }

    /// Bounds for a display id
    pub fn get(&self, id: ScreenId) -> Option<&DisplayBounds> {
        self.displays.iter().find(|d| d.id == id)
    }

    /// Iterate displays in deterministic (id-sorted) order
    pub fn iter(&self) -> impl Iterator<Item = &DisplayBounds> {
        self.displays.iter()
    }

    /// Resolve a point to a display.
    ///
    /// Exact half-open containment wins; otherwise the display with the
    /// highest proximity. Ties break toward the earlier display in
    /// iteration order.
    pub fn locate(&self, px: f64, py: f64) -> Option<ScreenId> {
        if self.displays.is_empty() {
            return None;
        }

        if let Some(hit) = self.displays.iter().find(|d| d.contains(px, py)) {
            return Some(hit.id);
        }

        let mut best: Option<(ScreenId, f64)> = None;
        for d in &self.displays {
            let score = d.proximity_to(px, py);
            match best {
                Some((_, s)) if score <= s => {}
                _ => best = Some((d.id, score)),
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Swap-a-snapshot handle to the current display map.
///
/// Readers take a cheap `Arc` clone per use; [`SharedDisplayMap::replace`]
/// swaps the snapshot atomically so attribution never observes a
/// half-updated topology.
#[derive(Debug, Clone)]
pub struct SharedDisplayMap {
    inner: Arc<RwLock<Arc<DisplayMap>>>,
}

impl SharedDisplayMap {
    /// Wrap an initial map
    pub fn new(map: DisplayMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(map))),
        }
    }

    /// Current snapshot
    pub fn current(&self) -> Arc<DisplayMap> {
        self.inner.read().clone()
    }

    /// Atomically replace the map
    pub fn replace(&self, map: DisplayMap) {
        *self.inner.write() = Arc::new(map);
    }
}

impl Default for SharedDisplayMap {
    fn default() -> Self {
        Self::new(DisplayMap::default())
    }
}
