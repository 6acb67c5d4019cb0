pub mod cli;
pub mod config;
pub mod job;
pub mod markdown;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod template;
pub mod util;
