//! Desktop entry point
//!
//! ```bash
//! MDP_API_BASE_URL=http://localhost:8000/api/v1 mdp-console
//! mdp-console --offline   # seeded in-memory backend
//! ```

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use mdp_client::{HttpClient, InMemoryClient, MdpClient};
use mdp_console::logging::init_tracing;
use mdp_console::ConsoleConfig;
use mdp_ui::MdpConsoleApp;

fn main() -> Result<()> {
    init_tracing("info,mdp_console=debug,mdp_ui=debug");

    let config = ConsoleConfig::from_env().context("invalid configuration")?;
    let offline = std::env::args().any(|arg| arg == "--offline");

    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to create tokio runtime")?,
    );

    let client: Arc<dyn MdpClient> = if offline {
        tracing::info!("using seeded in-memory backend");
        Arc::new(InMemoryClient::seeded())
    } else {
        Arc::new(
            HttpClient::with_timeout(&config.api_base_url, config.request_timeout)
                .with_context(|| format!("invalid base URL '{}'", config.api_base_url))?,
        )
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("MDP Console"),
        ..Default::default()
    };

    eframe::run_native(
        "MDP Console",
        options,
        Box::new(move |cc| Ok(Box::new(MdpConsoleApp::new(cc, config, client, runtime)))),
    )
    .map_err(|e| anyhow!("console exited with error: {e}"))
}
