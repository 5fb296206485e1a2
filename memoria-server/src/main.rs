//! Binary entrypoint. All wiring lives in [`memoria_server::bootstrap`]
//! so it stays testable without a `#[tokio::main]` wrapper in the way.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    memoria_server::run().await
}
