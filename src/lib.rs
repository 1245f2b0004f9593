//! Blog Server
//!
//! A small multi-user blogging service. Posts may carry a single image,
//! stored under a random name in the upload directory and tracked in the
//! `post_image` table.

pub mod api;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod image_store;
pub mod post;
pub mod server;
