use crate::core::etl::EtlEngine;
use crate::domain::ports::Pipeline;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_range;
use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use std::sync::Arc;
use std::time::Duration;

/// A fixed weekly fire time in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    weekday: Weekday,
    time: NaiveTime,
    offset: FixedOffset,
}

impl WeeklySchedule {
    pub fn new(weekday: Weekday, hour: u32, minute: u32, offset: FixedOffset) -> Result<Self> {
        validate_range("schedule.hour", hour, 0, 23)?;
        validate_range("schedule.minute", minute, 0, 59)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            EtlError::Validation {
                message: format!("invalid schedule time {hour:02}:{minute:02}"),
            }
        })?;
        Ok(Self {
            weekday,
            time,
            offset,
        })
    }

    /// First fire time strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_today = now.with_timezone(&self.offset).date_naive();
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - local_today.weekday().num_days_from_monday())
            % 7;

        let offset = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        let fire_at = |days: u32| {
            let local = (local_today + TimeDelta::days(i64::from(days))).and_time(self.time);
            Utc.from_utc_datetime(&(local - offset))
        };

        let candidate = fire_at(days_ahead);
        if candidate > now {
            candidate
        } else {
            fire_at(days_ahead + 7)
        }
    }
}

impl std::fmt::Display for WeeklySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "every {} at {} (UTC{})",
            self.weekday,
            self.time.format("%H:%M"),
            self.offset
        )
    }
}

/// Runs the pipeline at every fire time, forever. Failed runs are logged by
/// the engine and never stop the loop.
pub async fn run_weekly<P: Pipeline>(engine: Arc<EtlEngine<P>>, schedule: WeeklySchedule) {
    tracing::info!("🚀 Weekly crawl scheduled {}", schedule);
    loop {
        let now = Utc::now();
        let next = schedule.next_after(now);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::info!("⏰ Next scheduled crawl at {}", next.with_timezone(&schedule.offset));

        tokio::time::sleep(wait).await;

        tracing::info!("⏰ Scheduled crawl starting");
        let summary = engine.run().await;
        tracing::info!("⏰ Scheduled crawl finished: {}", summary);
    }
}
