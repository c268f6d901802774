use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const ALL_VARS: &[&str] = &[
    "WILDSCORE_CACHE_PATH",
    "WILDSCORE_CACHE_MAX_ENTRIES",
    "WILDSCORE_CACHE_TTL_SECS",
    "WILDSCORE_CACHE_MIN_SIMILARITY",
    "WILDSCORE_REASONING_MODEL",
    "WILDSCORE_EMBEDDING_MODEL",
    "WILDSCORE_EMBEDDING_URL",
    "WILDSCORE_EMBEDDING_DIM",
    "WILDSCORE_STUB_EMBEDDER",
    "WILDSCORE_CACHE_TOP_K",
    "WILDSCORE_MIN_CACHE_HITS",
    "WILDSCORE_MAX_SEARCH_RESULTS",
    "WILDSCORE_MIN_KEYWORD_CATEGORIES",
    "WILDSCORE_SCRAPE_TIMEOUT_SECS",
    "WILDSCORE_SCRAPE_DELAY_MS",
    "WILDSCORE_SEARCH_URL",
    "OPENAI_API_KEY",
    "GOOGLE_API_KEY",
    "GOOGLE_CSE_ID",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, serialized with #[serial].
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, serialized with #[serial].
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_wildscore_env() {
    // SAFETY: Test code only, serialized with #[serial].
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.cache_path, PathBuf::from("./.data/knowledge"));
    assert_eq!(config.cache_top_k, 3);
    assert_eq!(config.min_cache_hits, 2);
    assert_eq!(config.max_search_results, 3);
    assert_eq!(config.min_keyword_categories, 2);
    assert_eq!(config.scrape_timeout, Duration::from_secs(10));
    assert_eq!(config.scrape_delay, Duration::from_millis(100));
    assert_eq!(config.reasoning_model, "gpt-4o-mini");
    assert!(config.cache_max_entries.is_none());
    assert!(config.cache_ttl.is_none());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_wildscore_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.cache_top_k, 3);
    assert_eq!(config.embedding_dim, 1536);
    assert!(config.openai_api_key.is_none());
}

#[test]
#[serial]
fn test_missing_openai_key_forces_stub_embedder() {
    clear_wildscore_env();

    let config = Config::from_env().expect("should parse");
    assert!(config.stub_embedder);

    with_env_vars(&[("OPENAI_API_KEY", "sk-test")], || {
        let config = Config::from_env().expect("should parse");
        assert!(!config.stub_embedder);
    });
}

#[test]
#[serial]
fn test_stub_flag_overrides_present_key() {
    clear_wildscore_env();

    with_env_vars(
        &[("OPENAI_API_KEY", "sk-test"), ("WILDSCORE_STUB_EMBEDDER", "yes")],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.stub_embedder);
        },
    );
}

#[test]
#[serial]
fn test_invalid_flag_is_rejected() {
    clear_wildscore_env();

    with_env_vars(&[("WILDSCORE_STUB_EMBEDDER", "maybe")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_custom_values() {
    clear_wildscore_env();

    with_env_vars(
        &[
            ("WILDSCORE_CACHE_PATH", "/tmp/wildscore-kb"),
            ("WILDSCORE_CACHE_MAX_ENTRIES", "500"),
            ("WILDSCORE_CACHE_TTL_SECS", "3600"),
            ("WILDSCORE_CACHE_TOP_K", "5"),
            ("WILDSCORE_MIN_CACHE_HITS", "3"),
            ("WILDSCORE_SCRAPE_DELAY_MS", "0"),
            ("WILDSCORE_MIN_KEYWORD_CATEGORIES", "3"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.cache_path, PathBuf::from("/tmp/wildscore-kb"));
            assert_eq!(config.cache_max_entries, Some(500));
            assert_eq!(config.cache_ttl, Some(Duration::from_secs(3600)));
            assert_eq!(config.cache_top_k, 5);
            assert_eq!(config.min_cache_hits, 3);
            assert_eq!(config.scrape_delay, Duration::ZERO);
            assert_eq!(config.min_keyword_categories, 3);
            assert!(config.validate().is_ok());
        },
    );
}

#[test]
#[serial]
fn test_from_env_invalid_number() {
    clear_wildscore_env();

    with_env_vars(&[("WILDSCORE_CACHE_TOP_K", "three")], || {
        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidNumber { name, value, .. } => {
                assert_eq!(name, "WILDSCORE_CACHE_TOP_K");
                assert_eq!(value, "three");
            }
            other => panic!("unexpected error: {other}"),
        }
    });
}

#[test]
#[serial]
fn test_blank_values_fall_back_to_defaults() {
    clear_wildscore_env();

    with_env_vars(
        &[("WILDSCORE_CACHE_PATH", "   "), ("WILDSCORE_REASONING_MODEL", "")],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.cache_path, PathBuf::from("./.data/knowledge"));
            assert_eq!(config.reasoning_model, "gpt-4o-mini");
        },
    );
}

#[test]
fn test_validate_min_hits_above_top_k() {
    let config = Config {
        cache_top_k: 2,
        min_cache_hits: 3,
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange { .. })
    ));
}

#[test]
fn test_validate_zero_top_k() {
    let config = Config {
        cache_top_k: 0,
        min_cache_hits: 0,
        ..Default::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_search_result_cap() {
    let config = Config {
        max_search_results: 11,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        max_search_results: 10,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_keyword_categories_range() {
    for bad in [0, 5] {
        let config = Config {
            min_keyword_categories: bad,
            ..Default::default()
        };
        assert!(config.validate().is_err(), "{bad} should be rejected");
    }
}

#[test]
fn test_validate_zero_capacity() {
    let config = Config {
        cache_max_entries: Some(0),
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_cache_path_is_file() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = Config {
        cache_path: file.path().to_path_buf(),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_search_credentials_missing() {
    let config = Config::default();
    let err = config.search_credentials().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingEnvVar {
            name: "GOOGLE_API_KEY"
        }
    ));

    let config = Config {
        google_api_key: Some("key".to_string()),
        ..Default::default()
    };
    let err = config.search_credentials().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingEnvVar {
            name: "GOOGLE_CSE_ID"
        }
    ));
}

#[test]
fn test_debug_redacts_keys() {
    let config = Config {
        openai_api_key: Some("sk-secret".to_string()),
        google_api_key: Some("g-secret".to_string()),
        ..Default::default()
    };

    let debug = format!("{:?}", config);
    assert!(!debug.contains("sk-secret"));
    assert!(!debug.contains("g-secret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_derived_resolver_config() {
    let config = Config {
        cache_top_k: 4,
        min_cache_hits: 3,
        ..Default::default()
    };

    let resolver = config.resolver_config();
    assert_eq!(resolver.cache_top_k, 4);
    assert_eq!(resolver.min_cache_hits, 3);
    assert_eq!(resolver.query_prefix, "wildlife conservation recent data");
}

#[test]
#[serial]
fn test_cache_min_similarity_from_env() {
    clear_wildscore_env();

    with_env_vars(&[("WILDSCORE_CACHE_MIN_SIMILARITY", "0.35")], || {
        let config = Config::from_env().unwrap();
        assert_eq!(config.cache_min_similarity, Some(0.35));
        assert_eq!(config.knowledge_config().min_similarity, Some(0.35));
    });

    with_env_vars(&[("WILDSCORE_CACHE_MIN_SIMILARITY", "high")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidDecimal { name: "WILDSCORE_CACHE_MIN_SIMILARITY", .. })
        ));
    });
}

#[test]
fn test_validate_min_similarity_range() {
    let config = Config {
        cache_min_similarity: Some(1.5),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfRange { name: "WILDSCORE_CACHE_MIN_SIMILARITY", .. })
    ));
    assert!(Config::default().validate().is_ok());
}
