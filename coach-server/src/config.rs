use coach_core::{CoachConfig, CoachConfigSnapshot};

pub const ENV_PREFIX: &str = "COACH__";

const DEFAULTS: &[(&str, &str)] = &[
    ("http.host", "127.0.0.1"),
    ("http.port", "3030"),
    ("database.max_connections", "5"),
    ("storage.backend", "postgres"),
    ("blob.backend", "s3"),
    ("blob.key_prefix", "coach/"),
    ("ingest.max_photo_bytes", "10485760"),
    ("remote.backend", "http"),
    ("remote.timeout_secs", "10"),
];

/// Defaults overlaid with `COACH__*` environment variables.
pub fn load() -> CoachConfigSnapshot {
    let mut config = CoachConfig::new();
    let loaded = config.load_env(ENV_PREFIX);
    apply_defaults(&mut config);
    tracing::debug!(loaded, "configuration loaded from environment");
    config.snapshot()
}

pub fn apply_defaults(config: &mut CoachConfig) {
    for (key, value) in DEFAULTS {
        config.set_default(*key, *value);
    }
}

/// Everything in memory; handy for local runs and tests.
pub fn in_memory() -> CoachConfigSnapshot {
    let mut config = CoachConfig::new();
    config.set("storage.backend", "memory");
    config.set("blob.backend", "memory");
    config.set("blob.bucket", "coach-photos");
    config.set("remote.backend", "memory");
    apply_defaults(&mut config);
    config.snapshot()
}
