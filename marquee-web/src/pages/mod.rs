//! Full page handlers using component system
//!
//! Pages compose multiple components into complete HTML responses.

pub mod home;

pub use home::home_page;
