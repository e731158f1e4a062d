pub mod builder;
pub mod client;
pub mod session;
pub mod submitter;
pub mod tracker;
