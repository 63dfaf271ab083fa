//! Process configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `LIBRARY_*` environment variables, and config
//! files. [`LibrarySettings::validate`] turns the raw, optional values into
//! [`RuntimeSettings`]; any failure there is fatal at startup.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::domain::ports::CacheKey;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_ROSTER_KEY: &str = "oncall";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Raw settings as supplied by the operator.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIBRARY")]
pub struct LibrarySettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Redis connection string.
    pub redis_url: Option<String>,
    /// Base URL of the on-call directory service.
    pub directory_url: Option<String>,
    /// HTTP listen address.
    pub bind_addr: Option<String>,
    /// Seconds between scheduled priming cycles.
    #[ortho_config(default = DEFAULT_REFRESH_INTERVAL_SECS)]
    pub refresh_interval_secs: Option<u64>,
    /// Lifetime of cached rosters, in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// Bound on each cache or directory call, in milliseconds.
    pub operation_timeout_ms: Option<u64>,
    /// Roster keys to prime. The first is the default key.
    ///
    /// The environment form is a comma-separated list; a single key is
    /// accepted on its own.
    #[serde(default, deserialize_with = "one_or_many_keys")]
    pub roster_keys: Option<Vec<String>>,
    /// Maximum PostgreSQL pool size.
    pub db_max_connections: Option<u32>,
}

/// Startup configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A required setting was absent or blank.
    #[error("missing required setting {setting}")]
    Missing {
        /// Name of the setting.
        setting: &'static str,
    },
    /// A connection string did not parse as a URL.
    #[error("setting {setting} is not a valid URL: {message}")]
    InvalidUrl {
        /// Name of the setting.
        setting: &'static str,
        /// Parser diagnostic.
        message: String,
    },
    /// The listen address is not `host:port`.
    #[error("setting bind_addr is not a socket address: {value}")]
    InvalidBindAddr {
        /// Rejected value.
        value: String,
    },
    /// A duration or pool size was zero.
    #[error("setting {setting} must be greater than zero")]
    Zero {
        /// Name of the setting.
        setting: &'static str,
    },
    /// The roster key list was empty or held a blank key.
    #[error("setting roster_keys is invalid: {message}")]
    InvalidRosterKeys {
        /// Why the list was rejected.
        message: String,
    },
}

/// Validated settings consumed by the composition root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Redis connection string.
    pub redis_url: String,
    /// Base URL of the on-call directory.
    pub directory_url: Url,
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// Period of scheduled priming cycles.
    pub refresh_interval: Duration,
    /// Lifetime of cached rosters.
    pub cache_ttl: Duration,
    /// Bound on each cache or directory call.
    pub operation_timeout: Duration,
    /// Never empty; the first key is the default roster.
    pub roster_keys: Vec<CacheKey>,
    /// Maximum PostgreSQL pool size.
    pub db_max_connections: u32,
}

impl LibrarySettings {
    /// Apply defaults and check every value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] for the first setting that is missing
    /// or malformed.
    pub fn validate(&self) -> Result<RuntimeSettings, ConfigurationError> {
        let database_url = required(self.database_url.as_deref(), "database_url")?;
        let redis_url = required(self.redis_url.as_deref(), "redis_url")?;
        let raw_directory = required(self.directory_url.as_deref(), "directory_url")?;

        parse_url(&database_url, "database_url")?;
        parse_url(&redis_url, "redis_url")?;
        let directory_url = parse_url(&raw_directory, "directory_url")?;

        let raw_bind = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).trim();
        let bind_addr = raw_bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigurationError::InvalidBindAddr {
                value: raw_bind.to_owned(),
            })?;

        let refresh_interval = Duration::from_secs(non_zero(
            self.refresh_interval_secs,
            DEFAULT_REFRESH_INTERVAL_SECS,
            "refresh_interval_secs",
        )?);
        let cache_ttl = Duration::from_secs(non_zero(
            self.cache_ttl_secs,
            DEFAULT_CACHE_TTL_SECS,
            "cache_ttl_secs",
        )?);
        let operation_timeout = Duration::from_millis(non_zero(
            self.operation_timeout_ms,
            DEFAULT_OPERATION_TIMEOUT_MS,
            "operation_timeout_ms",
        )?);

        let raw_keys = self
            .roster_keys
            .as_ref()
            .map_or_else(|| DEFAULT_ROSTER_KEY.to_owned(), |keys| keys.join(","));
        let roster_keys = CacheKey::parse_list(&raw_keys).map_err(|err| {
            ConfigurationError::InvalidRosterKeys {
                message: err.to_string(),
            }
        })?;
        if roster_keys.is_empty() {
            return Err(ConfigurationError::InvalidRosterKeys {
                message: "at least one key is required".to_owned(),
            });
        }

        let db_max_connections = self
            .db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        if db_max_connections == 0 {
            return Err(ConfigurationError::Zero {
                setting: "db_max_connections",
            });
        }

        Ok(RuntimeSettings {
            database_url,
            redis_url,
            directory_url,
            bind_addr,
            refresh_interval,
            cache_ttl,
            operation_timeout,
            roster_keys,
            db_max_connections,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many_keys<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(raw.map(|keys| match keys {
        OneOrMany::One(key) => vec![key],
        OneOrMany::Many(keys) => keys,
    }))
}

fn required(value: Option<&str>, setting: &'static str) -> Result<String, ConfigurationError> {
    match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(raw.to_owned()),
        _ => Err(ConfigurationError::Missing { setting }),
    }
}

fn parse_url(raw: &str, setting: &'static str) -> Result<Url, ConfigurationError> {
    Url::parse(raw).map_err(|err| ConfigurationError::InvalidUrl {
        setting,
        message: err.to_string(),
    })
}

fn non_zero(
    value: Option<u64>,
    default: u64,
    setting: &'static str,
) -> Result<u64, ConfigurationError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigurationError::Zero { setting }),
        positive => Ok(positive),
    }
}

#[cfg(test)]
mod tests {
    //! Loading and validation of library settings.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::{fixture, rstest};

    const ALL_VARS: [&str; 9] = [
        "LIBRARY_DATABASE_URL",
        "LIBRARY_REDIS_URL",
        "LIBRARY_DIRECTORY_URL",
        "LIBRARY_BIND_ADDR",
        "LIBRARY_REFRESH_INTERVAL_SECS",
        "LIBRARY_CACHE_TTL_SECS",
        "LIBRARY_OPERATION_TIMEOUT_MS",
        "LIBRARY_ROSTER_KEYS",
        "LIBRARY_DB_MAX_CONNECTIONS",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> LibrarySettings {
        let vars = ALL_VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        LibrarySettings::load_from_iter([OsString::from("library-api")])
            .expect("config should load")
    }

    #[fixture]
    fn complete() -> LibrarySettings {
        LibrarySettings {
            database_url: Some("postgres://library@localhost/library".to_owned()),
            redis_url: Some("redis://localhost:6379".to_owned()),
            directory_url: Some("http://directory.internal".to_owned()),
            bind_addr: None,
            refresh_interval_secs: None,
            cache_ttl_secs: None,
            operation_timeout_ms: None,
            roster_keys: None,
            db_max_connections: None,
        }
    }

    #[rstest]
    fn defaults_apply_when_only_connections_are_set(complete: LibrarySettings) {
        let runtime = complete.validate().expect("valid settings");

        assert_eq!(runtime.bind_addr, "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(runtime.refresh_interval, Duration::from_secs(60));
        assert_eq!(runtime.cache_ttl, Duration::from_secs(300));
        assert_eq!(runtime.operation_timeout, Duration::from_millis(2_000));
        assert_eq!(runtime.db_max_connections, 10);
        let keys: Vec<&str> = runtime.roster_keys.iter().map(CacheKey::as_str).collect();
        assert_eq!(keys, ["oncall"]);
    }

    #[rstest]
    #[case::database("database_url")]
    #[case::redis("redis_url")]
    #[case::directory("directory_url")]
    fn missing_connection_strings_are_rejected(
        mut complete: LibrarySettings,
        #[case] setting: &'static str,
    ) {
        match setting {
            "database_url" => complete.database_url = None,
            "redis_url" => complete.redis_url = Some("   ".to_owned()),
            _ => complete.directory_url = None,
        }

        assert_eq!(
            complete.validate(),
            Err(ConfigurationError::Missing { setting })
        );
    }

    #[rstest]
    fn unparsable_directory_url_is_rejected(mut complete: LibrarySettings) {
        complete.directory_url = Some("not a url".to_owned());
        assert!(matches!(
            complete.validate(),
            Err(ConfigurationError::InvalidUrl {
                setting: "directory_url",
                ..
            })
        ));
    }

    #[rstest]
    fn bad_bind_address_is_rejected(mut complete: LibrarySettings) {
        complete.bind_addr = Some("localhost".to_owned());
        assert!(matches!(
            complete.validate(),
            Err(ConfigurationError::InvalidBindAddr { .. })
        ));
    }

    #[rstest]
    #[case::interval("refresh_interval_secs")]
    #[case::ttl("cache_ttl_secs")]
    #[case::timeout("operation_timeout_ms")]
    fn zero_durations_are_rejected(mut complete: LibrarySettings, #[case] setting: &'static str) {
        match setting {
            "refresh_interval_secs" => complete.refresh_interval_secs = Some(0),
            "cache_ttl_secs" => complete.cache_ttl_secs = Some(0),
            _ => complete.operation_timeout_ms = Some(0),
        }

        assert_eq!(complete.validate(), Err(ConfigurationError::Zero { setting }));
    }

    #[rstest]
    #[case::blank(&[" "])]
    #[case::empty(&[])]
    fn empty_roster_key_list_is_rejected(
        mut complete: LibrarySettings,
        #[case] raw: &[&str],
    ) {
        complete.roster_keys = Some(raw.iter().map(|key| (*key).to_owned()).collect());
        assert!(matches!(
            complete.validate(),
            Err(ConfigurationError::InvalidRosterKeys { .. })
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("LIBRARY_DATABASE_URL", "postgres://library@db/library"),
            ("LIBRARY_REDIS_URL", "redis://cache:6379"),
            ("LIBRARY_DIRECTORY_URL", "http://directory:9000"),
            ("LIBRARY_BIND_ADDR", "127.0.0.1:9090"),
            ("LIBRARY_CACHE_TTL_SECS", "120"),
            ("LIBRARY_ROSTER_KEYS", "oncall,oncall-db"),
        ]);

        let runtime = settings.validate().expect("valid settings");

        assert_eq!(runtime.bind_addr, "127.0.0.1:9090".parse().expect("addr"));
        assert_eq!(runtime.cache_ttl, Duration::from_secs(120));
        assert_eq!(runtime.directory_url.as_str(), "http://directory:9000/");
        let keys: Vec<&str> = runtime.roster_keys.iter().map(CacheKey::as_str).collect();
        assert_eq!(keys, ["oncall", "oncall-db"]);
    }

    #[rstest]
    #[case::single("oncall", &["oncall"])]
    #[case::list("oncall,oncall-db", &["oncall", "oncall-db"])]
    #[case::duplicates("oncall, oncall-db ,oncall", &["oncall", "oncall-db"])]
    fn roster_keys_load_from_the_environment(#[case] raw: &str, #[case] expected: &[&str]) {
        let settings = load_with(&[
            ("LIBRARY_DATABASE_URL", "postgres://library@db/library"),
            ("LIBRARY_REDIS_URL", "redis://cache:6379"),
            ("LIBRARY_DIRECTORY_URL", "http://directory:9000"),
            ("LIBRARY_ROSTER_KEYS", raw),
        ]);

        let runtime = settings.validate().expect("valid settings");

        let keys: Vec<&str> = runtime.roster_keys.iter().map(CacheKey::as_str).collect();
        assert_eq!(keys, expected);
    }

    #[rstest]
    fn empty_environment_loads_with_defaults() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.refresh_interval_secs,
            Some(DEFAULT_REFRESH_INTERVAL_SECS)
        );
        assert!(settings.database_url.is_none());
        assert!(settings.roster_keys.is_none());
    }

    #[rstest]
    fn missing_environment_fails_validation() {
        let settings = load_with(&[]);
        assert_eq!(
            settings.validate(),
            Err(ConfigurationError::Missing {
                setting: "database_url"
            })
        );
    }
}
