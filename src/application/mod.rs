// Application layer - Use cases and ports
pub mod api_client;
pub mod dashboard_store;
