#[tokio::main]
async fn main() {
    gym::start_server().await;
}
