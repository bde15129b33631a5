#![allow(clippy::module_name_repetitions)]
pub mod config;
pub mod feed;
pub mod fetch;
pub mod normalize;
pub mod state;
pub mod sync;
pub mod syndication;
