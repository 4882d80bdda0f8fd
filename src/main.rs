use cadastre_coords::{logger, CadastreSession, Config, Runner, RunStatus};
use tracing::error;

#[tokio::main]
async fn main() {
    logger::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("💥 {e}");
            std::process::exit(RunStatus::FatalError(e.to_string()).exit_code());
        }
    };

    let runner = Runner::new(config.clone());
    let mut session = CadastreSession::new(&config);
    let status = runner.run(&mut session).await;

    std::process::exit(status.exit_code());
}
