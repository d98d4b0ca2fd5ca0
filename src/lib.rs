//! Client for the RepoIcon icon generation service.
//!
//! A repository URL is submitted to the backend, which answers with a task id;
//! the task is then polled until it reports an image or an error.

pub mod api;
pub mod config;
pub mod errors;
pub mod github;
pub mod models;
pub mod poller;
pub mod session;
pub mod ui;
