use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::slack::model::Ts;

/// The local calendar day before `now`, from 00:00:00 to 23:59:59.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl ArchiveWindow {
    pub fn day_before(now: DateTime<Utc>, tz: Tz) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        let yesterday = today.pred_opt().unwrap_or(today);

        Self {
            start: start_of_day(yesterday, tz),
            end: start_of_day(today, tz) - TimeDelta::seconds(1),
        }
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn oldest(&self) -> Ts {
        Ts::from_unix(self.start.timestamp())
    }

    pub fn latest(&self) -> Ts {
        Ts::from_unix(self.end.timestamp())
    }
}

/// Where DST starts at midnight the day begins at the first hour that exists.
fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    (0..=2)
        .find_map(|hour| {
            date.and_hms_opt(hour, 0, 0)
                .and_then(|local| tz.from_local_datetime(&local).earliest())
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
}
