pub mod log;
pub mod service;
pub mod tools;
