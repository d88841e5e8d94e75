mod cli;
mod config;
mod events;
mod geometry;
mod gestures;
mod host;
mod input;
mod live;
mod logging;
mod pinch_zoom;
mod replay;
mod tap;
mod tracker;
mod zoom;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
