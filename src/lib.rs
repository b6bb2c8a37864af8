pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod heat;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod publish;
pub mod readme;
pub mod summary;
pub mod util;
