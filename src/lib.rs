pub mod config;
pub mod hierarchy;
pub mod metrics;
pub mod models;
pub mod oracle;
pub mod overrides;
pub mod permissions;
pub mod scope;
pub mod visibility;
