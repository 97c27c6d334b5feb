use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use anyhow::Context;
use clap::Parser;
use crate::enums::router_kind::RouterKind;

#[derive(Parser, Debug)]
#[command(name = "heartbeat", about = "Liveness endpoint server")]
pub struct AppConfig {
    //Interface to bind
    #[clap(long, env = "HEARTBEAT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[clap(long, env = "HEARTBEAT_PORT", default_value_t = 3000)]
    pub port: u16,

    //Router implementation backing the server
    #[clap(long, env = "HEARTBEAT_ROUTER", value_enum, default_value_t = RouterKind::Axum)]
    pub router: RouterKind,
}

impl AppConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self.host
            .parse()
            .with_context(|| format!("Invalid host address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Loads `.env` if present, then parses flags and environment.
pub fn get_app_config() -> Arc<AppConfig> {
    dotenv::dotenv().ok();
    Arc::new(AppConfig::parse())
}
