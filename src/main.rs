#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    dataset_capture::gui::run_gui().map_err(|e| anyhow::anyhow!("GUI error: {:?}", e))?;
    Ok(())
}
