pub mod config;
pub mod controller;
pub mod feeling_entry;
pub mod journal_state;
pub mod kv_store;
pub mod logging;
pub mod render;
pub mod ui;
