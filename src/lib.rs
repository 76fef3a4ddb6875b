pub mod auth;
pub mod db;
pub mod engagement;
pub mod error;
pub mod handlers;
pub mod models;

pub use db::create_pool;
pub use error::EngagementError;
