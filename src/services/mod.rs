pub mod auth_service;
pub mod access_service;
