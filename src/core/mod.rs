//! Core console interfaces and text helpers.

pub mod console;
pub mod style;
pub mod width;
