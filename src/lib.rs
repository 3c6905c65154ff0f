pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod report;
pub mod script;
