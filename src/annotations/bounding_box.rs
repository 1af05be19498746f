use serde::Serialize;
use thiserror::Error;

/// Reasons a box cannot be constructed.
#[derive(Debug, Error, PartialEq)]
pub enum BoundingBoxError {
    #[error("Failed to create BoundingBox, value for left >= value for right ({left} >= {right}).")]
    InvertedHorizontal { left: u32, right: u32 },
    #[error("Failed to create BoundingBox, value for top >= value for bottom ({top} >= {bottom}).")]
    InvertedVertical { top: u32, bottom: u32 },
}

/// A struct representing a bounding box in pixel coordinates.
///
/// A bounding box is the rectangle drawn around a cell on the smear image. This project uses the
/// standard convention of the left side of the image being x=0 and the top of the image being
/// y=0. `right` and `bottom` are exclusive, so a box spanning a whole 800 pixel wide image has
/// `left == 0` and `right == 800`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "[u32; 4]")]
pub struct BoundingBox {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl BoundingBox {
    /// Checks if a box has a non-empty area before constructing.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Result<Self, BoundingBoxError> {
        if left >= right {
            Err(BoundingBoxError::InvertedHorizontal { left, right })
        } else if top >= bottom {
            Err(BoundingBoxError::InvertedVertical { top, bottom })
        } else {
            Ok(BoundingBox { left, top, right, bottom })
        }
    }

    /// Builds a box from its top-left corner and a non-zero size.
    pub fn from_origin_and_size(
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, BoundingBoxError> {
        BoundingBox::new(
            left,
            top,
            left.saturating_add(width),
            top.saturating_add(height),
        )
    }

    pub fn left(&self) -> u32 {
        self.left
    }

    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn right(&self) -> u32 {
        self.right
    }

    pub fn bottom(&self) -> u32 {
        self.bottom
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn as_xyxy(&self) -> (u32, u32, u32, u32) {
        (self.left, self.top, self.right, self.bottom)
    }

    /// True when the box lies inside an image of the given size.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.right() <= image_width && self.bottom() <= image_height
    }
}

impl From<BoundingBox> for [u32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.left, bbox.top, bbox.right, bbox.bottom]
    }
}
