pub mod cache;
pub mod engine;
pub mod remote;
pub mod request;
