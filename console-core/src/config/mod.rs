use crate::error::CoreError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Prefix for environment overrides, e.g. `APP_GATEWAY__URL`.
pub const ENV_PREFIX: &str = "APP";

/// Load settings from `<config_dir>/base.yaml` (optional) layered with
/// `APP_`-prefixed environment variables. A `.env` file in the working
/// directory is honoured.
pub fn load_layered<T: DeserializeOwned>(config_dir: &Path) -> Result<T, CoreError> {
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(File::from(config_dir.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
