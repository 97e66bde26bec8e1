pub mod config;
pub mod function;
pub mod input;
pub mod logging;
pub mod storage;
pub mod tracking;
pub mod version;
