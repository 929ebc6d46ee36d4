use uniroute::{config::Config, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    start_server(Config::load()).await
}
