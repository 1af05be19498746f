pub mod bounding_box;
pub mod cell_class;
pub mod detection;
