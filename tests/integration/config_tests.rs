//! The shipped configuration file

use std::path::Path;
use taskhub::server::builder::{ConfigSource, load_config};

#[test]
fn test_shipped_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/taskhub.yaml");
    let (config, source) = tokio_test::block_on(load_config(&path)).unwrap();

    assert_eq!(source, ConfigSource::File(path));
    assert_eq!(config.server().port, 5000);
    assert_eq!(config.storage().database.url, "sqlite://taskhub.db?mode=rwc");
    assert!(!config.storage().database.is_memory());
    assert_eq!(config.uploads().max_files, 10);
    assert!(config.uploads().allowed_extensions.iter().any(|e| e == "pdf"));
    assert_eq!(config.app.rate_limit.max_attempts, 5);
}

