//! Infrastructure layer - Store backends, authentication and logging

pub mod auth;
pub mod logging;
pub mod store;
