mod render;
mod ui;

use std::{env, error::Error, fs::File, sync::Mutex};

use particlecosmo::PhysicsConfig;

const LOG_PATH_VAR: &str = "PARTICLECOSMO_LOG";
const CONFIG_PATH_VAR: &str = "PARTICLECOSMO_CONFIG";
const DEFAULT_LOG_PATH: &str = "particlecosmo.log";

/// The terminal is owned by the UI, so logs go to a file.
fn init_tracing() -> Result<(), Box<dyn Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let path = env::var(LOG_PATH_VAR).unwrap_or_else(|_| DEFAULT_LOG_PATH.to_string());
    let file = File::create(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .init();

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(())
}

fn load_config() -> Result<PhysicsConfig, Box<dyn Error>> {
    match env::var(CONFIG_PATH_VAR) {
        Ok(path) => {
            let config = PhysicsConfig::load(&path)?;
            tracing::info!(%path, "loaded config");
            Ok(config)
        }
        Err(_) => Ok(PhysicsConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing()?;
    let config = load_config()?;
    ui::run(config)
}
