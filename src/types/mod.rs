//! Type definitions

pub mod appointment;
pub mod call;
pub mod campaign;
pub mod dashboard;
pub mod followup;
pub mod inbox;
pub mod lead;
pub mod messages;
pub mod patient;

pub use appointment::*;
pub use call::*;
pub use campaign::*;
pub use dashboard::*;
pub use followup::*;
pub use inbox::*;
pub use lead::*;
pub use messages::*;
pub use patient::*;
