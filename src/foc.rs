// FOC (Field Oriented Control) building blocks
// Coordinate transforms, PI regulation and speed estimation

pub mod pi_controller;
pub mod speed_estimator;
pub mod transforms;

// Re-export main types for easier access
pub use pi_controller::PiController;
pub use speed_estimator::SpeedEstimator;
pub use transforms::{inverse_park, limit_voltage, park, DqVector, UvwVector};
