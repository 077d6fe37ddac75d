pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod notify;
pub mod remote;
pub mod render;
pub mod session;
pub mod view_state;
