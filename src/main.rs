use gateplane::cli::run_cli;

#[tokio::main]
async fn main() -> gateplane::Result<()> {
    run_cli().await
}
