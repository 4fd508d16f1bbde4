use std::env;
use std::time::Duration;

use foundation::LatLng;
use tracing::warn;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_RESTCOUNTRIES_URL: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_USER_AGENT: &str = "journey-globe/0.1";
pub const MIN_QUERY_LENGTH: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct ServicesConfig {
    pub nominatim_url: String,
    pub restcountries_url: String,
    pub user_agent: String,
    pub search_limit: u32,
    pub search_debounce: Duration,
    pub min_query_len: usize,
    /// Device position reported by the fixed geolocation provider.
    pub current_location: Option<LatLng>,
    pub geolocation_timeout: Duration,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            restcountries_url: DEFAULT_RESTCOUNTRIES_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_limit: 5,
            search_debounce: Duration::from_millis(250),
            min_query_len: MIN_QUERY_LENGTH,
            current_location: None,
            geolocation_timeout: Duration::from_secs(10),
        }
    }
}

impl ServicesConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparseable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let current_location = lookup("JOURNEY_CURRENT_LOCATION").and_then(|raw| {
            let parsed = parse_lat_lng(&raw);
            if parsed.is_none() {
                warn!("ignoring JOURNEY_CURRENT_LOCATION={raw:?}: expected \"lat,lng\"");
            }
            parsed
        });

        Self {
            nominatim_url: lookup("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            restcountries_url: lookup("RESTCOUNTRIES_URL").unwrap_or(defaults.restcountries_url),
            user_agent: lookup("JOURNEY_USER_AGENT").unwrap_or(defaults.user_agent),
            search_limit: env_var_or(&lookup, "JOURNEY_SEARCH_LIMIT", defaults.search_limit),
            search_debounce: Duration::from_millis(env_var_or(
                &lookup,
                "JOURNEY_SEARCH_DEBOUNCE_MS",
                defaults.search_debounce.as_millis() as u64,
            )),
            min_query_len: defaults.min_query_len,
            current_location,
            geolocation_timeout: Duration::from_millis(env_var_or(
                &lookup,
                "JOURNEY_GEOLOCATION_TIMEOUT_MS",
                defaults.geolocation_timeout.as_millis() as u64,
            )),
        }
    }
}

fn env_var_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse `"lat,lng"`; rejects out-of-range positions.
pub fn parse_lat_lng(raw: &str) -> Option<LatLng> {
    let (lat, lng) = raw.split_once(',')?;
    let pos = LatLng::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?);
    pos.is_valid().then_some(pos)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{ServicesConfig, parse_lat_lng};
    use foundation::LatLng;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = ServicesConfig::from_lookup(|_| None);
        assert_eq!(cfg, ServicesConfig::default());
        assert_eq!(cfg.search_debounce, Duration::from_millis(250));
        assert_eq!(cfg.min_query_len, 3);
    }

    #[test]
    fn reads_overrides() {
        let cfg = ServicesConfig::from_lookup(lookup_from(&[
            ("NOMINATIM_URL", "http://localhost:8080"),
            ("JOURNEY_SEARCH_LIMIT", "8"),
            ("JOURNEY_SEARCH_DEBOUNCE_MS", "100"),
            ("JOURNEY_CURRENT_LOCATION", "52.52, 13.405"),
        ]));
        assert_eq!(cfg.nominatim_url, "http://localhost:8080");
        assert_eq!(cfg.search_limit, 8);
        assert_eq!(cfg.search_debounce, Duration::from_millis(100));
        assert_eq!(cfg.current_location, Some(LatLng::new(52.52, 13.405)));
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = ServicesConfig::from_lookup(lookup_from(&[
            ("JOURNEY_SEARCH_LIMIT", "lots"),
            ("JOURNEY_CURRENT_LOCATION", "somewhere"),
        ]));
        assert_eq!(cfg.search_limit, 5);
        assert_eq!(cfg.current_location, None);
    }

    #[test]
    fn lat_lng_parsing() {
        assert_eq!(parse_lat_lng("1.5,-2"), Some(LatLng::new(1.5, -2.0)));
        assert_eq!(parse_lat_lng("95,0"), None);
        assert_eq!(parse_lat_lng("1.5"), None);
    }
}
