#![forbid(unsafe_code)]

pub mod analyze;
pub mod cli;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod search;
