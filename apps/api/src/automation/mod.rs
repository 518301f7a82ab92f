//! Automation: the run controller, its phase runner and the HTTP surface around it.

pub mod controller;
pub mod handlers;
pub(crate) mod runner;
pub mod settings;
pub mod state;
