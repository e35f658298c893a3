// tests/config_env.rs
//
// WatcherConfig::load(): file discovery, env overrides, fatal errors.
// Env and CWD are process-global, so every test here is serial.

use std::{env, fs, time::Duration};

use honeyfarm_watch::{ConfigError, Network, WatcherConfig};

const VARS: &[&str] = &[
    "WATCHER_CONFIG_PATH",
    "NETWORK",
    "DISCORD_WEBHOOK_URL",
    "CONTRACT",
    "POLL_INTERVAL",
    "STARTUP_GRACE_SECS",
    "SIMULATION_INTERVAL_SECS",
    "HTTP_TIMEOUT_SECS",
    "API_ENDPOINTS",
    "TEST_MODE",
    "METRICS_ADDR",
];

fn clear_env() {
    for v in VARS {
        env::remove_var(v);
    }
}

/// Run `f` inside an empty temp CWD so the repo's own config/ is not picked up.
fn in_tmp_cwd<F: FnOnce(&std::path::Path)>(f: F) {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();
    f(tmp.path());
    clear_env();
    env::set_current_dir(old).unwrap();
}

#[serial_test::serial]
#[test]
fn env_only_with_defaults() {
    in_tmp_cwd(|_| {
        env::set_var("NETWORK", " TESTNET ");
        env::set_var("DISCORD_WEBHOOK_URL", "https://discord.test/api/webhooks/1/tok");

        let cfg = WatcherConfig::load().unwrap();
        assert_eq!(cfg.network, Network::Testnet);
        assert_eq!(cfg.contract, "farmforhoney");
        assert_eq!(cfg.endpoints, Network::Testnet.default_endpoints());
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert!(!cfg.test_mode);
    });
}

#[serial_test::serial]
#[test]
fn missing_required_settings_are_fatal() {
    in_tmp_cwd(|_| {
        env::set_var("DISCORD_WEBHOOK_URL", "https://discord.test/api/webhooks/1/tok");
        assert!(matches!(
            WatcherConfig::load(),
            Err(ConfigError::Missing("NETWORK"))
        ));

        env::set_var("NETWORK", "mainnet");
        env::remove_var("DISCORD_WEBHOOK_URL");
        assert!(matches!(
            WatcherConfig::load(),
            Err(ConfigError::Missing("DISCORD_WEBHOOK_URL"))
        ));

        env::set_var("DISCORD_WEBHOOK_URL", "https://discord.test/api/webhooks/1/tok");
        env::set_var("NETWORK", "jungle");
        assert!(matches!(
            WatcherConfig::load(),
            Err(ConfigError::InvalidNetwork(_))
        ));
    });
}

#[serial_test::serial]
#[test]
fn default_file_then_env_overrides() {
    in_tmp_cwd(|dir| {
        let cfg_dir = dir.join("config");
        fs::create_dir_all(&cfg_dir).unwrap();
        fs::write(
            cfg_dir.join("watcher.toml"),
            r#"
network = "mainnet"
discord_webhook_url = "https://discord.test/api/webhooks/2/file"
contract = "filecontract"
poll_interval_secs = 15
endpoints = ["https://a.test/", "https://b.test"]
"#,
        )
        .unwrap();

        let cfg = WatcherConfig::load().unwrap();
        assert_eq!(cfg.contract, "filecontract");
        assert_eq!(cfg.poll_interval, Duration::from_secs(15));
        assert_eq!(cfg.endpoints, vec!["https://a.test", "https://b.test"]);

        env::set_var("CONTRACT", "envcontract");
        env::set_var("API_ENDPOINTS", "https://c.test, https://d.test");
        env::set_var("TEST_MODE", "true");
        let cfg = WatcherConfig::load().unwrap();
        assert_eq!(cfg.contract, "envcontract");
        assert_eq!(cfg.poll_interval, Duration::from_secs(15));
        assert_eq!(cfg.endpoints, vec!["https://c.test", "https://d.test"]);
        assert!(cfg.test_mode);
    });
}

#[serial_test::serial]
#[test]
fn explicit_path_must_exist() {
    in_tmp_cwd(|dir| {
        env::set_var("WATCHER_CONFIG_PATH", dir.join("nope.toml"));
        assert!(matches!(
            WatcherConfig::load(),
            Err(ConfigError::MissingFile(_))
        ));

        let p = dir.join("custom.toml");
        fs::write(
            &p,
            "network = \"testnet\"\ndiscord_webhook_url = \"https://discord.test/x\"\nmetrics_addr = \"127.0.0.1:9187\"\n",
        )
        .unwrap();
        env::set_var("WATCHER_CONFIG_PATH", &p);
        let cfg = WatcherConfig::load().unwrap();
        assert_eq!(cfg.network, Network::Testnet);
        assert_eq!(cfg.metrics_addr, Some("127.0.0.1:9187".parse().unwrap()));
    });
}

#[serial_test::serial]
#[test]
fn malformed_numbers_are_rejected() {
    in_tmp_cwd(|_| {
        env::set_var("NETWORK", "mainnet");
        env::set_var("DISCORD_WEBHOOK_URL", "https://discord.test/api/webhooks/1/tok");
        env::set_var("POLL_INTERVAL", "ten");
        assert!(matches!(
            WatcherConfig::load(),
            Err(ConfigError::InvalidValue { key: "POLL_INTERVAL", .. })
        ));
    });
}
