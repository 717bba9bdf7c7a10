pub mod conversation;
pub mod document;
pub mod enums;
pub mod profile;
pub mod symptom;

pub use conversation::*;
pub use document::*;
pub use enums::*;
pub use profile::*;
pub use symptom::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
