//! Opening hours and the clinic clock.

use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::geo::distance_km;
use crate::models::Coordinates;
use crate::poll::{PollHandle, Poller};

/// Where the clinic is in its day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HoursStatus {
    Open,
    ClosingSoon,
    Closed,
}

impl HoursStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HoursStatus::Open => "OPEN",
            HoursStatus::ClosingSoon => "CLOSING SOON",
            HoursStatus::Closed => "CLOSED",
        }
    }
}

/// Daily schedule in local hours (0-23).
///
/// Open in `[open_hour, closing_soon_hour)`, closing soon in
/// `[closing_soon_hour, close_hour)`, closed otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpeningHours {
    pub open_hour: u32,
    pub closing_soon_hour: u32,
    pub close_hour: u32,
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self {
            open_hour: 8,
            closing_soon_hour: 17,
            close_hour: 19,
        }
    }
}

impl OpeningHours {
    pub fn validate(&self) -> Result<(), String> {
        if self.open_hour < self.closing_soon_hour
            && self.closing_soon_hour <= self.close_hour
            && self.close_hour <= 24
        {
            Ok(())
        } else {
            Err(format!(
                "opening hours must satisfy open < closing_soon <= close <= 24, got {}/{}/{}",
                self.open_hour, self.closing_soon_hour, self.close_hour
            ))
        }
    }

    pub fn status_at_hour(&self, hour: u32) -> HoursStatus {
        if hour >= self.open_hour && hour < self.closing_soon_hour {
            HoursStatus::Open
        } else if hour >= self.closing_soon_hour && hour < self.close_hour {
            HoursStatus::ClosingSoon
        } else {
            HoursStatus::Closed
        }
    }

    pub fn status_at<T: Timelike>(&self, time: &T) -> HoursStatus {
        self.status_at_hour(time.hour())
    }

    /// Patient-facing explanation of a status.
    pub fn message(&self, status: HoursStatus) -> String {
        match status {
            HoursStatus::Open => "The clinic is currently accepting patients.".to_string(),
            HoursStatus::ClosingSoon => {
                "The clinic is about to close soon. Please hurry if you have appointments."
                    .to_string()
            }
            HoursStatus::Closed => format!(
                "The clinic is closed. Please visit during {} to {}.",
                format_hour(self.open_hour),
                format_hour(self.closing_soon_hour)
            ),
        }
    }

    /// Build the status card for `now`.
    pub fn report(
        &self,
        now: NaiveDateTime,
        clinic: Coordinates,
        user: Option<Coordinates>,
    ) -> HoursReport {
        let status = self.status_at(&now);
        HoursReport {
            status,
            message: self.message(status),
            clock: now.format("%A, %B %-d, %Y • %H:%M:%S").to_string(),
            distance_km: user.map(|position| distance_km(position, clinic)),
        }
    }

    /// Rebuild the status card every `interval` from the local clock.
    pub fn spawn_clock<F>(
        &self,
        interval: Duration,
        clinic: Coordinates,
        user: Option<Coordinates>,
        mut on_tick: F,
    ) -> PollHandle
    where
        F: FnMut(HoursReport) + Send + 'static,
    {
        let hours = self.clone();
        Poller::spawn("clinic-clock", interval, move || {
            on_tick(hours.report(Local::now().naive_local(), clinic, user));
            Ok::<(), std::convert::Infallible>(())
        })
    }
}

/// "8:00 AM" style hour label.
fn format_hour(hour: u32) -> String {
    let suffix = if hour % 24 < 12 { "AM" } else { "PM" };
    let twelve = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:00 {}", twelve, suffix)
}

/// The clinic status card.
#[derive(Debug, Clone, PartialEq)]
pub struct HoursReport {
    pub status: HoursStatus,
    pub message: String,
    /// Formatted local date and time
    pub clock: String,
    /// Omitted when the device position is unknown
    pub distance_km: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::mpsc;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_status_boundaries() {
        let hours = OpeningHours::default();
        assert_eq!(hours.status_at_hour(7), HoursStatus::Closed);
        assert_eq!(hours.status_at_hour(8), HoursStatus::Open);
        assert_eq!(hours.status_at_hour(16), HoursStatus::Open);
        assert_eq!(hours.status_at_hour(17), HoursStatus::ClosingSoon);
        assert_eq!(hours.status_at_hour(18), HoursStatus::ClosingSoon);
        assert_eq!(hours.status_at_hour(19), HoursStatus::Closed);
        assert_eq!(hours.status_at_hour(0), HoursStatus::Closed);
    }

    #[test]
    fn test_closed_message_uses_schedule() {
        let hours = OpeningHours::default();
        assert_eq!(
            hours.message(HoursStatus::Closed),
            "The clinic is closed. Please visit during 8:00 AM to 5:00 PM."
        );
        assert_eq!(format_hour(0), "12:00 AM");
        assert_eq!(format_hour(12), "12:00 PM");
    }

    #[test]
    fn test_report() {
        let hours = OpeningHours::default();
        let clinic = Coordinates::new(8.471514, 124.623992);

        let report = hours.report(at(9, 30), clinic, None);
        assert_eq!(report.status, HoursStatus::Open);
        assert_eq!(report.distance_km, None);
        assert_eq!(report.clock, "Monday, March 3, 2025 • 09:30:00");

        let report = hours.report(at(17, 5), clinic, Some(clinic));
        assert_eq!(report.status, HoursStatus::ClosingSoon);
        assert_eq!(report.distance_km, Some(0.0));
    }

    #[test]
    fn test_validate() {
        assert!(OpeningHours::default().validate().is_ok());
        let backwards = OpeningHours {
            open_hour: 18,
            closing_soon_hour: 9,
            close_hour: 20,
        };
        assert!(backwards.validate().is_err());
    }

    #[test]
    fn test_clock_ticks() {
        let (tx, rx) = mpsc::channel();
        let handle = OpeningHours::default().spawn_clock(
            Duration::from_millis(5),
            Coordinates::new(8.47, 124.62),
            None,
            move |report| {
                let _ = tx.send(report);
            },
        );

        let report = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        handle.stop();
        assert!(!report.message.is_empty());
    }
}
