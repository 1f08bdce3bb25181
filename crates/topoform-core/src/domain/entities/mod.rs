//! Domain entities.

pub mod catalog;
pub mod common;
pub mod graph;
pub mod service;
