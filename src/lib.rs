pub mod config;
pub mod extract;
pub mod load;
pub mod normalize;
pub mod report;
pub mod schema;
pub mod skiplog;
