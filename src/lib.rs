//! Sense and example sentence synchronization between Signbank's CSV cells
//! and its relational store.

pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;
pub mod store;

pub use error::{Error, Result};
