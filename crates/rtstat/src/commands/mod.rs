//! Command handlers: bridge CLI args to the capture pipeline and output
//! formatting.

pub mod capture;
pub mod config_cmd;
pub mod routers;
