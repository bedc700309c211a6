use clap::Parser;
use log::{error, info};

use hair2tfrecord::{convert_dataset, Args, ConverterConfig};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ConverterConfig::from(Args::parse());

    info!("Starting the conversion process...");

    if let Err(e) = convert_dataset(&config) {
        error!("Failed to convert dataset: {}", e);
        std::process::exit(1);
    }
}
