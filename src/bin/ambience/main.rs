//! ambience - terminal ambient sound mixer
//!
//! Run with: cargo run
//! Logs go to stderr; set RUST_LOG=ambience=debug and redirect 2> to a file.

mod app;
mod ui;

use ambience::{AmbientMixer, MixerConfig};
use app::App;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mixer = AmbientMixer::with_default_output(MixerConfig::default());

    let mut terminal = ratatui::init();
    let result = App::new(&mixer).run(&mut terminal);
    ratatui::restore();

    mixer.dispose()?;
    result
}
