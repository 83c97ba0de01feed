//! Presentation layer: askama templates and their view models.

pub mod views;
