//! `agrovision` binary entrypoint.

#[tokio::main]
async fn main() {
    let exit_code = agrovision_cli::run().await;
    std::process::exit(exit_code);
}
