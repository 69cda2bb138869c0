use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment prefix shared by every crate (`APP_BACKEND__BASE_URL`).
pub const ENV_PREFIX: &str = "APP";

/// Load settings for `crate_name` from `<crate>/config/base.yaml` and `APP_*` variables.
///
/// The config directory is found whether the process runs from the workspace root
/// or from inside the crate directory. A missing `base.yaml` is not an error; every
/// field then needs a serde default or an environment override.
pub fn get_configuration<T: DeserializeOwned>(crate_name: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let configuration_directory = configuration_directory(&base_path, crate_name);

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

fn configuration_directory(base_path: &Path, crate_name: &str) -> PathBuf {
    if base_path.ends_with(crate_name) {
        base_path.join("config")
    } else {
        base_path.join(crate_name).join("config")
    }
}
