use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = roster::cli::Cli::parse();
    if let Err(e) = roster::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
