use recruiting_analyst_cli::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("analyst error: {err}");
        std::process::exit(1);
    }
}
