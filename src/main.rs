use anyhow::Result;
use ascii_viewer::{app::App, cli::Cli, config::ViewerConfig};
use clap::Parser;
use winit::event_loop::EventLoop;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ViewerConfig::from_cli(&cli)?;
    log::debug!("Config: {:?}", config);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    log::info!("ASCII Viewer - drag the model to orbit, scroll to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
