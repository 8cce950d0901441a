use tally::cli::{output, run_cli};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run_cli(args).await {
        output::error(format!("Error: {err}"));
        std::process::exit(1);
    }
}
