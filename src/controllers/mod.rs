pub mod heartbeat;
pub mod router;
pub mod serve_mux;
pub mod server;
