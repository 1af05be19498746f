pub mod class_profile;
pub mod detection_model;
pub mod detection_utils;
pub mod simulated_detector;
