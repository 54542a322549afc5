use std::sync::Arc;

use gmb_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), gmb_core::Error> {
    gmb_core::logging::init("gmb")?;

    // Configuration errors end the process here, before any connection is made.
    let cfg = Arc::new(Config::load()?);

    gmb_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| gmb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
