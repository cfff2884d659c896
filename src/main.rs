use anyhow::Context;
use std::path::PathBuf;

use trackforge::{demo, init_logging, BuilderConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // optional config path as the only argument
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => BuilderConfig::load_from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BuilderConfig::load_or_default()?,
    };

    init_logging(&config.general.log_level)?;
    tracing::info!("trackforge {}", VERSION);

    let summary = demo::run(&config).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
