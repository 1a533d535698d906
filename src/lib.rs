// Position update model and admission validation
pub mod position;

// State store and tracker engine
pub mod state;

// Broadcast hub subscriber set
pub mod hub;

// HTTP and SSE APIs
pub mod api;

// Configuration
pub mod config;
