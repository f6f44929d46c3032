//! Device location: permission gate, one-shot fixes and position watches.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{distance_km, GeoError, GeoResult};
use crate::models::Coordinates;
use crate::poll::{PollHandle, Poller};

/// Outcome of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Requested fix accuracy, passed through to the platform.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationAccuracy {
    Lowest,
    Low,
    Balanced,
    High,
    #[default]
    Highest,
}

/// Thresholds for a continuous position watch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchOptions {
    pub accuracy: LocationAccuracy,
    /// How often to ask for a fix
    pub time_interval_ms: u64,
    /// Minimum movement before a new fix is reported
    pub distance_interval_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: LocationAccuracy::Highest,
            time_interval_ms: 2_000,
            distance_interval_m: 1.0,
        }
    }
}

impl WatchOptions {
    pub fn time_interval(&self) -> Duration {
        Duration::from_millis(self.time_interval_ms)
    }
}

/// Platform location services.
pub trait LocationProvider: Send + Sync {
    /// Prompt for (or report) foreground location permission.
    fn request_permission(&self) -> PermissionStatus;

    /// A single position fix.
    fn current_position(&self, accuracy: LocationAccuracy) -> GeoResult<Coordinates>;
}

const PERMISSION_UNKNOWN: u8 = 0;
const PERMISSION_GRANTED: u8 = 1;
const PERMISSION_DENIED: u8 = 2;

/// Permission-aware wrapper around a [`LocationProvider`].
///
/// The permission prompt is shown at most once. A denial is logged once and
/// remembered; afterwards every location feature quietly reports nothing until
/// [`LocationService::reset_permission`] is called from an explicit user action.
pub struct LocationService<P: LocationProvider> {
    provider: Arc<P>,
    permission: AtomicU8,
}

impl<P: LocationProvider> LocationService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            permission: AtomicU8::new(PERMISSION_UNKNOWN),
        }
    }

    fn ensure_permission(&self) -> GeoResult<()> {
        match self.permission.load(Ordering::Acquire) {
            PERMISSION_GRANTED => return Ok(()),
            PERMISSION_DENIED => return Err(GeoError::PermissionDenied),
            _ => {}
        }

        match self.provider.request_permission() {
            PermissionStatus::Granted => {
                self.permission.store(PERMISSION_GRANTED, Ordering::Release);
                Ok(())
            }
            PermissionStatus::Denied => {
                if self.permission.swap(PERMISSION_DENIED, Ordering::AcqRel) != PERMISSION_DENIED {
                    tracing::warn!("Location permission denied, continuing without location");
                }
                Err(GeoError::PermissionDenied)
            }
        }
    }

    /// Forget a previous answer so the next request prompts again.
    pub fn reset_permission(&self) {
        self.permission.store(PERMISSION_UNKNOWN, Ordering::Release);
    }

    pub fn try_current_position(&self, accuracy: LocationAccuracy) -> GeoResult<Coordinates> {
        self.ensure_permission()?;
        self.provider.current_position(accuracy)
    }

    /// Current position, or `None` when permission or the fix is unavailable.
    pub fn current_position(&self) -> Option<Coordinates> {
        match self.try_current_position(LocationAccuracy::default()) {
            Ok(position) => Some(position),
            Err(GeoError::PermissionDenied) => None,
            Err(e) => {
                tracing::debug!(error = %e, "No position fix");
                None
            }
        }
    }

    /// Distance from the device to `target`, if the device position is known.
    pub fn distance_to(&self, target: Coordinates) -> Option<f64> {
        self.current_position()
            .map(|position| distance_km(position, target))
    }
}

impl<P: LocationProvider + 'static> LocationService<P> {
    /// Start watching the device position.
    ///
    /// `on_update` receives the first fix and then every fix at least
    /// `distance_interval_m` away from the last reported one. Returns `None`
    /// without permission. Drop or stop the handle when the consumer goes away.
    pub fn watch<F>(&self, options: &WatchOptions, mut on_update: F) -> Option<PollHandle>
    where
        F: FnMut(Coordinates) + Send + 'static,
    {
        if self.ensure_permission().is_err() {
            return None;
        }

        let provider = Arc::clone(&self.provider);
        let accuracy = options.accuracy;
        let min_meters = options.distance_interval_m;
        let mut last_reported: Option<Coordinates> = None;

        Some(Poller::spawn(
            "location-watch",
            options.time_interval(),
            move || -> GeoResult<()> {
                let position = provider.current_position(accuracy)?;
                let moved = last_reported
                    .map_or(true, |last| distance_km(last, position) * 1000.0 >= min_meters);
                if moved {
                    last_reported = Some(position);
                    on_update(position);
                }
                Ok(())
            },
        ))
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use super::*;

    /// Scripted provider: hands out queued fixes, then repeats the last one.
    pub struct StubLocationProvider {
        pub granted: bool,
        pub prompts: AtomicUsize,
        fixes: Mutex<VecDeque<Coordinates>>,
        last: Mutex<Option<Coordinates>>,
    }

    impl StubLocationProvider {
        pub fn new(granted: bool, fixes: Vec<Coordinates>) -> Self {
            Self {
                granted,
                prompts: AtomicUsize::new(0),
                fixes: Mutex::new(fixes.into()),
                last: Mutex::new(None),
            }
        }
    }

    impl LocationProvider for StubLocationProvider {
        fn request_permission(&self) -> PermissionStatus {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            if self.granted {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            }
        }

        fn current_position(&self, _accuracy: LocationAccuracy) -> GeoResult<Coordinates> {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.fixes.lock().unwrap().pop_front() {
                *last = Some(next);
            }
            (*last).ok_or_else(|| GeoError::Unavailable("no fix".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::stub::StubLocationProvider;
    use super::*;

    const CLINIC: Coordinates = Coordinates {
        latitude: 8.4542,
        longitude: 124.6319,
    };

    #[test]
    fn test_granted_position_and_distance() {
        let provider = Arc::new(StubLocationProvider::new(
            true,
            vec![Coordinates::new(8.4600, 124.6340)],
        ));
        let service = LocationService::new(provider.clone());

        let distance = service.distance_to(CLINIC).unwrap();
        assert!(distance > 0.6 && distance < 0.8);
        assert_eq!(provider.prompts.load(Ordering::SeqCst), 1);

        // Permission is asked once
        service.current_position().unwrap();
        assert_eq!(provider.prompts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_denied_degrades_and_never_reprompts() {
        let provider = Arc::new(StubLocationProvider::new(false, vec![CLINIC]));
        let service = LocationService::new(provider.clone());

        assert_eq!(service.current_position(), None);
        assert_eq!(service.distance_to(CLINIC), None);
        assert_eq!(
            service.try_current_position(LocationAccuracy::High),
            Err(GeoError::PermissionDenied)
        );
        assert!(service.watch(&WatchOptions::default(), |_| {}).is_none());
        assert_eq!(provider.prompts.load(Ordering::SeqCst), 1);

        service.reset_permission();
        assert_eq!(service.current_position(), None);
        assert_eq!(provider.prompts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_no_fix_is_none() {
        let provider = Arc::new(StubLocationProvider::new(true, vec![]));
        let service = LocationService::new(provider);
        assert_eq!(service.current_position(), None);
    }

    #[test]
    fn test_watch_reports_only_movement() {
        let a = Coordinates::new(8.4542, 124.6319);
        let b = Coordinates::new(8.4600, 124.6340);
        let provider = Arc::new(StubLocationProvider::new(true, vec![a, a, a, b]));
        let service = LocationService::new(provider);

        let (tx, rx) = mpsc::channel();
        let options = WatchOptions {
            time_interval_ms: 5,
            ..Default::default()
        };
        let handle = service
            .watch(&options, move |position| {
                let _ = tx.send(position);
            })
            .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        handle.stop();

        assert_eq!(first, a);
        assert_eq!(second, b);
        // b keeps repeating after the queue drains; nothing more is reported
        assert!(rx.try_recv().is_err());
    }
}
