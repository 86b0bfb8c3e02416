#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brandsight_server::start().await
}
