//! Configuration: project settings file and the operator salt.

pub mod salt;
pub mod settings;

pub use salt::OperatorSalt;
pub use settings::{Backend, Settings};
