//! AI provider commands.

use smart_notes::cli::AppContext;
use smart_notes::services::ConnectionMonitor;
use std::sync::Arc;
use std::time::Duration;

/// Status command.
///
/// With `watch`, keeps probing until the process is interrupted.
pub fn cmd_status(app: &AppContext, watch: Option<u64>) -> anyhow::Result<()> {
    let active = app.ai().active_config();
    let provider = active.kind().display_name();
    println!("Provider: {provider} (model {})", active.model());

    let Some(secs) = watch else {
        let connected = app.ai().test_connection();
        println!("Status:   {}", describe(connected));
        if !connected {
            anyhow::bail!("{provider} is not reachable");
        }
        return Ok(());
    };

    let interval = Duration::from_secs(secs.max(1));
    let _monitor = ConnectionMonitor::start_with_listener(Arc::clone(app.ai()), interval, |connected| {
        println!(
            "{}  {}",
            chrono::Local::now().format("%H:%M:%S"),
            describe(connected)
        );
    });
    loop {
        std::thread::park();
    }
}

/// Models command.
pub fn cmd_models(app: &AppContext) -> anyhow::Result<()> {
    let active = app.ai().active_config();
    let models = app.ai().get_available_models();
    if models.is_empty() {
        println!("No models found for {}.", active.kind().display_name());
        return Ok(());
    }
    for model in models {
        let marker = if model == active.model() { "*" } else { " " };
        println!("{marker} {model}");
    }
    Ok(())
}

const fn describe(connected: bool) -> &'static str {
    if connected { "connected" } else { "disconnected" }
}
