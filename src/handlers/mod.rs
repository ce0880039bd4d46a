pub mod bmi;
pub mod wellness;

pub use bmi::{compute_bmi, BmiReport};
pub use wellness::WellnessAdvisor;
