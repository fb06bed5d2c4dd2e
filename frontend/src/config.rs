use auth_core::ClientConfig;

/// Client configuration baked in at build time.
///
/// `API_URL`, `LOGIN_PATH`, `HOME_PATH` and `CURRENT_USER_TTL_MS` are read from
/// the build environment; unset values keep their defaults.
pub fn client_config() -> ClientConfig {
    let config = ClientConfig::from_vars(|key| {
        let value = match key {
            "API_URL" => option_env!("API_URL"),
            "LOGIN_PATH" => option_env!("LOGIN_PATH"),
            "HOME_PATH" => option_env!("HOME_PATH"),
            "CURRENT_USER_TTL_MS" => option_env!("CURRENT_USER_TTL_MS"),
            _ => None,
        };
        value.map(str::to_string)
    });

    match config {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "Invalid build-time config, using defaults");
            ClientConfig::default()
        }
    }
}
