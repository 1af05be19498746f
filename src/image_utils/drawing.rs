use crate::annotations::cell_class::CellClass;
use crate::annotations::detection::Detection;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

/// Height of the label tab drawn above each box.
pub const LABEL_HEIGHT: u32 = 15;
/// Approximate advance of one label character, used to size the tab.
pub const LABEL_CHAR_WIDTH: u32 = 7;
const OUTLINE_WIDTH: u32 = 2;

pub fn class_color(class: CellClass) -> Rgb<u8> {
    match class {
        CellClass::Rbc => Rgb([0xff, 0x4b, 0x4b]),
        CellClass::Wbc => Rgb([0x9d, 0x00, 0xff]),
        CellClass::Platelets => Rgb([0xff, 0xa6, 0x00]),
    }
}

/// Draws a class coloured outline and label tab for every detection.
///
/// The outline is drawn inward from the box edge. The tab sits directly above the box and is
/// clipped by the canvas when the box touches the top of the image. Glyphs are not rendered.
pub fn draw_detections(mut image: RgbImage, detections: &[Detection]) -> RgbImage {
    for det in detections {
        let color = class_color(det.class());
        let bbox = det.bbox();
        for inset in 0..OUTLINE_WIDTH {
            if bbox.width() <= 2 * inset || bbox.height() <= 2 * inset {
                break;
            }
            let rect = Rect::at((bbox.left() + inset) as i32, (bbox.top() + inset) as i32)
                .of_size(bbox.width() - 2 * inset, bbox.height() - 2 * inset);
            draw_hollow_rect_mut(&mut image, rect, color);
        }

        let label = det.label().to_string();
        let tab = Rect::at(bbox.left() as i32, bbox.top() as i32 - LABEL_HEIGHT as i32)
            .of_size(label.chars().count() as u32 * LABEL_CHAR_WIDTH, LABEL_HEIGHT);
        draw_filled_rect_mut(&mut image, tab, color);
    }
    image
}
