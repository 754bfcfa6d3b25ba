use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

use fieldroute::config::{Config, DEFAULT_DIRECTIONS_URL, DEFAULT_GEOCODING_URL};

mod common;

const KEYS: [&str; 10] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "BASE_URL",
    "MAPS_API_KEY",
    "DIRECTIONS_URL",
    "GEOCODING_URL",
];

/// Runs `body` with every config variable cleared, then restores them.
fn with_clean_env(body: impl FnOnce()) {
    common::setup_test_env();
    let original: Vec<(&str, Option<String>)> =
        KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }

    body();

    for (key, value) in original {
        unsafe {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_defaults() {
    with_clean_env(|| {
        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "postgres://@localhost:5432/fieldroute");
        assert_eq!(
            config.jwt_secret,
            "your-super-secret-jwt-key-change-this-in-production-12345"
        );
        assert_eq!(config.jwt_expiration_days, 30);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.client_base_url, "http://localhost:3000");
        assert_eq!(config.maps_api_key, "");
        assert_eq!(config.directions_url, DEFAULT_DIRECTIONS_URL);
        assert_eq!(config.geocoding_url, DEFAULT_GEOCODING_URL);
        assert!(config.is_development());
        assert!(!config.is_production());
    });
}

#[test]
#[serial]
fn test_config_custom_values() {
    with_clean_env(|| {
        unsafe {
            env::set_var("DATABASE_URL", "postgres://app@db:5432/routes");
            env::set_var("JWT_SECRET", "test-secret");
            env::set_var("JWT_EXPIRATION_DAYS", "7");
            env::set_var("HOST", "0.0.0.0");
            env::set_var("PORT", "9000");
            env::set_var("ENVIRONMENT", "production");
            env::set_var("BASE_URL", "https://app.example.com");
            env::set_var("MAPS_API_KEY", "maps-key");
            env::set_var("DIRECTIONS_URL", "http://localhost:8089/directions");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "postgres://app@db:5432/routes");
        assert_eq!(config.jwt_secret, "test-secret");
        assert_eq!(config.jwt_expiration_days, 7);
        assert_eq!(config.server_address(), "0.0.0.0:9000");
        assert!(config.is_production());
        assert_eq!(config.client_base_url, "https://app.example.com");
        assert_eq!(config.maps_api_key, "maps-key");
        assert_eq!(config.directions_url, "http://localhost:8089/directions");
        assert_eq!(config.geocoding_url, DEFAULT_GEOCODING_URL);
    });
}

#[test]
#[serial]
fn test_config_unparsable_numbers_fall_back() {
    with_clean_env(|| {
        unsafe {
            env::set_var("PORT", "not-a-port");
            env::set_var("JWT_EXPIRATION_DAYS", "soon");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_expiration_days, 30);
    });
}
