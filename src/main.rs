#[tokio::main]
async fn main() {
    if let Err(e) = snake_arena_server::run_with_config().await {
        tracing::error!(error = %e, "fatal server error");
        std::process::exit(1);
    }
}
