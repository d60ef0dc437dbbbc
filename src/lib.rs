pub mod composer;
pub mod error;
pub mod parts;
pub mod smf;

pub use composer::{ArrangementConfig, Composer};
pub use error::Error;
