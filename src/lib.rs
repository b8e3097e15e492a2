pub mod broadcast;
pub mod collision;
pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod protocol;
pub mod session;
pub mod spawner;
pub mod state;
pub mod types;
pub mod world;
