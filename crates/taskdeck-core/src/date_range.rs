use std::fmt;

use chrono::{
  DateTime,
  Duration,
  LocalResult,
  SubsecRound,
  TimeZone,
  Utc
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};
use taskdeck_shared::RangeClause;
use tracing::{
  trace,
  warn
};

/// Symbolic due-date filters. A token only becomes an absolute interval
/// when it is resolved, so "last hour" always means "as of now".
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
pub enum PreselectedRange {
  #[serde(rename = "last_hour")]
  LastHour,
  #[serde(rename = "last_day")]
  LastDay,
  #[serde(rename = "last_7_days")]
  Last7Days,
  #[serde(rename = "last_30_days")]
  Last30Days,
  #[serde(rename = "last_90_days")]
  Last90Days,
  #[serde(rename = "next_hour")]
  NextHour,
  #[serde(rename = "next_day")]
  NextDay,
  #[serde(rename = "next_7_days")]
  Next7Days,
  #[serde(rename = "next_30_days")]
  Next30Days,
  #[serde(rename = "next_90_days")]
  Next90Days
}

impl PreselectedRange {
  pub const ALL: [PreselectedRange; 10] = [
    PreselectedRange::LastHour,
    PreselectedRange::LastDay,
    PreselectedRange::Last7Days,
    PreselectedRange::Last30Days,
    PreselectedRange::Last90Days,
    PreselectedRange::NextHour,
    PreselectedRange::NextDay,
    PreselectedRange::Next7Days,
    PreselectedRange::Next30Days,
    PreselectedRange::Next90Days
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | PreselectedRange::LastHour => {
        "last_hour"
      }
      | PreselectedRange::LastDay => {
        "last_day"
      }
      | PreselectedRange::Last7Days => {
        "last_7_days"
      }
      | PreselectedRange::Last30Days => {
        "last_30_days"
      }
      | PreselectedRange::Last90Days => {
        "last_90_days"
      }
      | PreselectedRange::NextHour => {
        "next_hour"
      }
      | PreselectedRange::NextDay => {
        "next_day"
      }
      | PreselectedRange::Next7Days => {
        "next_7_days"
      }
      | PreselectedRange::Next30Days => {
        "next_30_days"
      }
      | PreselectedRange::Next90Days => {
        "next_90_days"
      }
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|range| range.as_str() == key)
  }

  /// True for the `last_*` family.
  pub fn is_past(self) -> bool {
    matches!(
      self,
      PreselectedRange::LastHour
        | PreselectedRange::LastDay
        | PreselectedRange::Last7Days
        | PreselectedRange::Last30Days
        | PreselectedRange::Last90Days
    )
  }

  fn span(self) -> Duration {
    match self {
      | PreselectedRange::LastHour
      | PreselectedRange::NextHour => {
        Duration::hours(1)
      }
      | PreselectedRange::LastDay
      | PreselectedRange::NextDay => {
        Duration::days(1)
      }
      | PreselectedRange::Last7Days
      | PreselectedRange::Next7Days => {
        Duration::days(7)
      }
      | PreselectedRange::Last30Days
      | PreselectedRange::Next30Days => {
        Duration::days(30)
      }
      | PreselectedRange::Last90Days
      | PreselectedRange::Next90Days => {
        Duration::days(90)
      }
    }
  }

  fn truncates_to_day(self) -> bool {
    self.span() > Duration::days(1)
  }
}

impl fmt::Display for PreselectedRange {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidRangeError {
  #[error(
    "invalid {bound} timestamp \
     {input:?}: {reason}"
  )]
  Unparseable {
    bound:  &'static str,
    input:  String,
    reason: String
  },
  #[error(
    "range start {from} is after \
     range end {to}"
  )]
  Inverted {
    from: DateTime<Utc>,
    to:   DateTime<Utc>
  }
}

/// A concrete absolute interval.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct DateTimeRange {
  pub from: DateTime<Utc>,
  pub to:   DateTime<Utc>
}

impl DateTimeRange {
  pub fn new(
    from: DateTime<Utc>,
    to: DateTime<Utc>
  ) -> Result<Self, InvalidRangeError> {
    if from > to {
      return Err(
        InvalidRangeError::Inverted {
          from,
          to
        }
      );
    }
    Ok(Self {
      from,
      to
    })
  }

  pub fn parse_iso(
    from: &str,
    to: &str
  ) -> Result<Self, InvalidRangeError> {
    let from = parse_bound("from", from)?;
    let to = parse_bound("to", to)?;
    Self::new(from, to)
  }

  /// Resolves `range` against `now`. Sub-second precision is dropped
  /// and the current instant is nudged one second forward so it stays
  /// inside the interval. Multi-day ranges snap their far endpoint to
  /// the start of its day in `tz`.
  #[must_use]
  pub fn resolve(
    range: PreselectedRange,
    now: DateTime<Utc>,
    tz: &Tz
  ) -> Self {
    let now = now.trunc_subsecs(0);
    let nudged = now + Duration::seconds(1);
    let span = range.span();

    let out = if range.is_past() {
      let far = now - span;
      let from = if range.truncates_to_day()
      {
        start_of_day(far, tz)
      } else {
        far
      };
      Self {
        from,
        to: nudged
      }
    } else {
      let far = now + span;
      let to = if range.truncates_to_day()
      {
        start_of_day(far, tz)
      } else {
        far
      };
      Self {
        from: nudged,
        to
      }
    };

    trace!(
      range = %range,
      from = %out.from,
      to = %out.to,
      "resolved preselected range"
    );
    out
  }

  /// Resolves `range` against the wall clock.
  #[must_use]
  pub fn resolve_now(
    range: PreselectedRange,
    tz: &Tz
  ) -> Self {
    Self::resolve(range, Utc::now(), tz)
  }

  pub fn contains(
    &self,
    instant: DateTime<Utc>
  ) -> bool {
    self.from <= instant
      && instant <= self.to
  }

  pub fn to_clause(&self) -> RangeClause {
    RangeClause {
      gte: self.from,
      lte: self.to
    }
  }
}

fn parse_bound(
  bound: &'static str,
  raw: &str
) -> Result<DateTime<Utc>, InvalidRangeError>
{
  DateTime::parse_from_rfc3339(raw.trim())
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|err| {
      InvalidRangeError::Unparseable {
        bound,
        input: raw.to_string(),
        reason: err.to_string()
      }
    })
}

fn start_of_day(
  dt: DateTime<Utc>,
  tz: &Tz
) -> DateTime<Utc> {
  let date =
    dt.with_timezone(tz).date_naive();
  let midnight = date.and_time(
    chrono::NaiveTime::MIN
  );

  match tz.from_local_datetime(&midnight)
  {
    | LocalResult::Single(local) => {
      local.with_timezone(&Utc)
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      let chosen = if first <= second {
        first
      } else {
        second
      };
      chosen.with_timezone(&Utc)
    }
    | LocalResult::None => {
      first_local_instant(date, tz)
    }
  }
}

/// First instant of `date` in `tz` when midnight falls in a DST gap.
/// Gaps start on the hour or half hour, so quarter-hour steps land on
/// the first valid wall time.
fn first_local_instant(
  date: chrono::NaiveDate,
  tz: &Tz
) -> DateTime<Utc> {
  let midnight = date.and_time(
    chrono::NaiveTime::MIN
  );
  let first = (1..=24 * 4)
    .map(|step| {
      midnight
        + Duration::minutes(15 * step)
    })
    .find_map(|candidate| {
      tz.from_local_datetime(&candidate)
        .earliest()
    });

  match first {
    | Some(local) => {
      warn!(
        timezone = %tz,
        date = %date,
        start = %local,
        "midnight does not exist in timezone; using first local instant"
      );
      local.with_timezone(&Utc)
    }
    | None => {
      warn!(
        timezone = %tz,
        date = %date,
        "no valid local time on date; using UTC midnight"
      );
      midnight.and_utc()
    }
  }
}

#[must_use]
pub fn format_date(
  dt: DateTime<Utc>,
  tz: &Tz
) -> String {
  dt.with_timezone(tz)
    .format("%d/%m/%Y")
    .to_string()
}

#[must_use]
pub fn format_date_time(
  dt: DateTime<Utc>,
  tz: &Tz
) -> String {
  dt.with_timezone(tz)
    .format("%d/%m/%y, %H:%M")
    .to_string()
}
