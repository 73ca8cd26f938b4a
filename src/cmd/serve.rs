//! Board HTTP server command — `demand-board serve`.

use anyhow::Result;
use demand_board::config::BoardConfig;
use demand_board::kanban::server::{ServerConfig, start_server};

pub async fn cmd_serve(config: BoardConfig) -> Result<()> {
    start_server(ServerConfig::from(&config)).await
}
