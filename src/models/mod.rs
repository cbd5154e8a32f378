//! Core data models shared by the controller and its host collaborators

pub mod tab;
pub mod script;

pub use tab::*;
pub use script::*;
