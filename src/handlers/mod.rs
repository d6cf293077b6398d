pub mod health;
pub mod lead;

pub use health::health_config;
pub use lead::lead_config;
