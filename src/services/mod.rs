pub mod intake_service;
pub mod lead_service;
pub mod verification_service;

pub use intake_service::*;
pub use lead_service::*;
pub use verification_service::*;
