mod actuators;
mod host;
mod mqtt;
mod sensor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
