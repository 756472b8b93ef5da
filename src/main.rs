#[tokio::main(flavor = "current_thread")]
async fn main() {
    pickman::app::startup::startup().await;
}
