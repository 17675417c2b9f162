use lifeline_core::{Composer, CoreError, FallbackComposer, HttpComposer};

use crate::store::CliConfig;

pub async fn run() -> Result<(), CoreError> {
    let config = CliConfig::load()?;
    let tip = match &config.compose_endpoint {
        Some(endpoint) => HttpComposer::new(endpoint.clone()).compose_safety_tip().await,
        None => FallbackComposer.compose_safety_tip().await,
    };
    println!("{tip}");
    Ok(())
}
