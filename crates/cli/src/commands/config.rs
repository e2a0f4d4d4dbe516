use wayfarer_core::AppConfig;

pub fn run(config: &AppConfig) -> String {
    config.redacted_summary()
}
