use producto_api::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::run().await
}
