//! Media backend for the POFSTUDIO site: image categories, videos and songs
//! stored as plain files under a media root, served over a small JSON API.

pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod errors;
pub mod media;
pub mod routes;
pub mod storage;
pub mod upload;
pub mod wire;

pub use config::AppConfig;
pub use errors::{ApiError, StoreError};
pub use routes::router;
pub use storage::{LocalMediaStore, MediaStore};
