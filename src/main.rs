//! Gangway CLI binary entry point.

#[tokio::main]
async fn main() {
    if let Err(e) = gangway::cli::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
