pub mod cropping;
pub mod drawing;
pub mod image_io;
