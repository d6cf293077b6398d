pub mod intake;
pub mod provider;
pub mod twilio;

pub use intake::*;
pub use provider::*;
pub use twilio::*;
