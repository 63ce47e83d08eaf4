/// Entry point. The tokio runtime backs the async file dialogs; the UI
/// event loop itself stays on the main thread.
#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    robocards::run_app()
}
