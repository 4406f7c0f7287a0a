use entity_tables::shell::build_client;
use entity_tables::shell::config::ShellConfig;
use entity_tables::shell::playground::{
    UpdateMode, verify_concurrency_conflict_behavior, verify_update_behavior,
};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ShellConfig::load()?;
    fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .init();

    let client = build_client(&config);
    tracing::info!(table = client.table_name(), "running table playground");

    verify_concurrency_conflict_behavior(&client).await?;
    verify_update_behavior(&client, UpdateMode::Replace).await?;
    verify_update_behavior(&client, UpdateMode::Merge).await?;
    Ok(())
}
