pub mod aiserver;
pub mod body;
pub mod config;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod stream;
