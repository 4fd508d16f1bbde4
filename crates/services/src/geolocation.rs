use std::sync::Arc;
use std::time::Duration;

use foundation::LatLng;
use tracing::{debug, warn};

use crate::config::ServicesConfig;
use crate::http::BoxFuture;

pub const UNAVAILABLE_MESSAGE: &str = "Unable to retrieve your location.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    Unsupported,
    PermissionDenied,
    Timeout,
    Unavailable(String),
}

impl GeolocationError {
    pub fn user_message(&self) -> String {
        match self {
            GeolocationError::Unsupported => {
                "Geolocation is not supported on this device.".to_string()
            }
            GeolocationError::PermissionDenied => "Location permission was denied.".to_string(),
            GeolocationError::Timeout => "Timed out while retrieving your location.".to_string(),
            GeolocationError::Unavailable(reason) if !reason.trim().is_empty() => reason.clone(),
            GeolocationError::Unavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationError::Unsupported => write!(f, "geolocation unsupported"),
            GeolocationError::PermissionDenied => write!(f, "geolocation permission denied"),
            GeolocationError::Timeout => write!(f, "geolocation timed out"),
            GeolocationError::Unavailable(reason) => {
                write!(f, "position unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for GeolocationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix a provider may hand back.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5),
        }
    }
}

/// Source of the device's position.
pub trait Geolocator: Send + Sync {
    fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> BoxFuture<'_, Result<LatLng, GeolocationError>>;
}

/// Always reports the same position; used when the position is configured.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: LatLng,
}

impl FixedGeolocator {
    pub fn new(position: LatLng) -> Self {
        Self { position }
    }
}

impl Geolocator for FixedGeolocator {
    fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> BoxFuture<'_, Result<LatLng, GeolocationError>> {
        let position = self.position;
        Box::pin(async move {
            if position.is_valid() {
                Ok(position)
            } else {
                Err(GeolocationError::Unavailable(UNAVAILABLE_MESSAGE.to_string()))
            }
        })
    }
}

/// No positioning capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

impl Geolocator for UnsupportedGeolocator {
    fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> BoxFuture<'_, Result<LatLng, GeolocationError>> {
        Box::pin(async { Err(GeolocationError::Unsupported) })
    }
}

/// Enforces `options.timeout` on any provider.
pub struct TimeoutGeolocator<G> {
    inner: G,
}

impl<G: Geolocator> TimeoutGeolocator<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

impl<G: Geolocator> Geolocator for TimeoutGeolocator<G> {
    fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> BoxFuture<'_, Result<LatLng, GeolocationError>> {
        Box::pin(async move {
            match tokio::time::timeout(options.timeout, self.inner.current_position(options)).await
            {
                Ok(Ok(position)) => {
                    debug!(lat = position.lat, lng = position.lng, "device position");
                    Ok(position)
                }
                Ok(Err(err)) => {
                    warn!("geolocation failed: {err}");
                    Err(err)
                }
                Err(_) => {
                    warn!("geolocation timed out after {:?}", options.timeout);
                    Err(GeolocationError::Timeout)
                }
            }
        })
    }
}

/// The fixed provider when a position is configured, otherwise unsupported.
pub fn geolocator_from_config(config: &ServicesConfig) -> Arc<dyn Geolocator> {
    match config.current_location {
        Some(position) => Arc::new(TimeoutGeolocator::new(FixedGeolocator::new(position))),
        None => Arc::new(TimeoutGeolocator::new(UnsupportedGeolocator)),
    }
}

/// Options with the configured timeout.
pub fn geolocation_options(config: &ServicesConfig) -> GeolocationOptions {
    GeolocationOptions {
        timeout: config.geolocation_timeout,
        ..GeolocationOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use foundation::LatLng;

    use super::*;
    use crate::config::ServicesConfig;

    struct NeverAnswers;

    impl Geolocator for NeverAnswers {
        fn current_position(
            &self,
            _options: GeolocationOptions,
        ) -> BoxFuture<'_, Result<LatLng, GeolocationError>> {
            Box::pin(std::future::pending())
        }
    }

    #[test]
    fn default_options() {
        let opts = GeolocationOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.maximum_age, Duration::from_secs(5));
    }

    #[test]
    fn messages() {
        assert_eq!(
            GeolocationError::Unavailable(String::new()).user_message(),
            UNAVAILABLE_MESSAGE
        );
        assert_eq!(
            GeolocationError::Unavailable("GPS off".into()).user_message(),
            "GPS off"
        );
        assert!(GeolocationError::Unsupported.user_message().contains("not supported"));
    }

    #[tokio::test]
    async fn fixed_and_unsupported_providers() {
        let opts = GeolocationOptions::default();
        let here = LatLng::new(52.52, 13.405);
        assert_eq!(
            FixedGeolocator::new(here).current_position(opts).await,
            Ok(here)
        );
        assert_eq!(
            UnsupportedGeolocator.current_position(opts).await,
            Err(GeolocationError::Unsupported)
        );
        assert!(matches!(
            FixedGeolocator::new(LatLng::new(f64::NAN, 0.0))
                .current_position(opts)
                .await,
            Err(GeolocationError::Unavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_providers_time_out() {
        let geo = TimeoutGeolocator::new(NeverAnswers);
        let opts = GeolocationOptions {
            timeout: Duration::from_millis(500),
            ..GeolocationOptions::default()
        };
        assert_eq!(
            geo.current_position(opts).await,
            Err(GeolocationError::Timeout)
        );
    }

    #[tokio::test]
    async fn configured_provider() {
        let mut config = ServicesConfig::default();
        let opts = geolocation_options(&config);
        assert_eq!(
            geolocator_from_config(&config).current_position(opts).await,
            Err(GeolocationError::Unsupported)
        );

        config.current_location = Some(LatLng::new(1.0, 2.0));
        assert_eq!(
            geolocator_from_config(&config).current_position(opts).await,
            Ok(LatLng::new(1.0, 2.0))
        );
    }
}
