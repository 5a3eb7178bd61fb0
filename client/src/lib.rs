pub mod app;
pub mod beacon;
pub mod commands;
pub mod config;
pub mod handoff;
pub mod network;
pub mod prelude;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod view;
pub mod widgets;
