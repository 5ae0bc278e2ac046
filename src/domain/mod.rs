//! Domain layer: post records and the pure classification pipeline.

pub mod category;
pub mod classify;
pub mod feed;
pub mod posts;
