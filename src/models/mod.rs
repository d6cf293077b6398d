pub mod common;
pub mod lead;
pub mod verification;

pub use common::*;
pub use lead::*;
pub use verification::*;
