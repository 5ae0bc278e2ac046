//! Application services composing the domain pipeline over the content repo.

pub mod archive;
pub mod error;
pub mod feed;
pub mod forms;
pub mod home;
pub mod pagination;
pub mod search;
pub mod sitemap;
