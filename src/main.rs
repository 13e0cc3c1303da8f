#[tokio::main]
async fn main() {
  let code = workout_builder::cli::run().await;
  std::process::exit(code);
}
