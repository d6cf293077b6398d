pub mod email;
pub mod phone;

pub use email::*;
pub use phone::*;
