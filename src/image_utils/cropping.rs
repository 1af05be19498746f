use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::cell_class::WbcSubtype;
use crate::annotations::detection::Detection;
use image::{RgbImage, imageops};

/// One entry of the white cell gallery.
#[derive(Debug)]
pub struct WbcCrop {
    pub image: RgbImage,
    pub subtype: WbcSubtype,
    pub bbox: BoundingBox,
}

/// Cuts every white cell out of `image`, in detection order.
pub fn crop_wbcs(image: &RgbImage, detections: &[Detection]) -> Vec<WbcCrop> {
    detections
        .iter()
        .filter_map(|det| {
            let subtype = det.subtype()?;
            let bbox = *det.bbox();
            let crop = imageops::crop_imm(image, bbox.left(), bbox.top(), bbox.width(), bbox.height())
                .to_image();
            Some(WbcCrop { image: crop, subtype, bbox })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::cell_class::CellLabel;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn crops_only_white_cells_in_order() {
        let detections = vec![
            Detection::new(BoundingBox::new(0, 0, 5, 5).unwrap(), CellLabel::Rbc, 0.9),
            Detection::new(
                BoundingBox::new(10, 20, 30, 50).unwrap(),
                CellLabel::Wbc(WbcSubtype::Monocyte),
                0.9,
            ),
            Detection::new(BoundingBox::new(1, 1, 4, 4).unwrap(), CellLabel::Platelets, 0.9),
            Detection::new(
                BoundingBox::new(40, 40, 45, 48).unwrap(),
                CellLabel::Wbc(WbcSubtype::Blast),
                0.9,
            ),
        ];
        let crops = crop_wbcs(&gradient(64, 64), &detections);

        assert_eq!(crops.len(), 2);
        assert_eq!(crops[0].subtype, WbcSubtype::Monocyte);
        assert_eq!(crops[0].image.dimensions(), (20, 30));
        assert_eq!(crops[0].image.get_pixel(0, 0), &Rgb([10, 20, 0]));
        assert_eq!(crops[0].image.get_pixel(19, 29), &Rgb([29, 49, 0]));
        assert_eq!(crops[1].subtype, WbcSubtype::Blast);
        assert_eq!(crops[1].image.dimensions(), (5, 8));
        assert_eq!(crops[1].bbox.as_xyxy(), (40, 40, 45, 48));
    }

    #[test]
    fn no_white_cells_no_crops() {
        let detections = vec![Detection::new(
            BoundingBox::new(0, 0, 5, 5).unwrap(),
            CellLabel::Rbc,
            0.9,
        )];
        assert!(crop_wbcs(&gradient(8, 8), &detections).is_empty());
    }
}
