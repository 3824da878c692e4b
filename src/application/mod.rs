// Application layer - Use cases over the dashboard domain
pub mod dashboard_repository;
pub mod dashboard_service;
pub mod persistence;
pub mod visualization_service;
