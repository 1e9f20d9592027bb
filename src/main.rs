use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use touchcontroller::persistence::AppConfig;
use touchcontroller::transport::{MqttTransport, Transport};
use touchcontroller::ui::TouchControllerUI;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = AppConfig::load_or_default().await?;
    info!(
        "Publishing to {} on topic {}",
        config.transport.url, config.transport.topic
    );

    let transport = MqttTransport::connect(&config.transport)
        .map_err(|e| eyre!("Failed to set up MQTT transport: {}", e))?;
    let transport: Box<dyn Transport> = Box::new(transport);

    let ui = TouchControllerUI::new(&config, transport)
        .map_err(|e| eyre!("Failed to build controller layout: {}", e))?;

    info!("Starting UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_inner_size([
            config.session.initial_width as f32,
            config.session.initial_height as f32,
        ])
        .with_fullscreen(true);

    eframe::run_native(
        "TouchController",
        native_options,
        Box::new(move |_cc| Ok(Box::new(ui))),
    )
    .map_err(|e| eyre!("UI terminated with error: {}", e))?;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
