//! Dashboard KPIs: today vs all-time counts.
//!
//! "Today" is the calendar day of `now` in `now`'s own timezone, so the day
//! boundary is local midnight. The server passes `chrono::Local::now()`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::{
  record::{LeadStatus, Snapshot},
  scans::percentage,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardKpis {
  pub date:              NaiveDate,
  pub total_contacts:    usize,
  pub today_contacts:    usize,
  pub hot_leads:         usize,
  pub total_scans:       usize,
  pub today_scans:       usize,
  pub total_signups:     usize,
  pub today_signups:     usize,
  pub total_wheel_plays: usize,
  pub today_wheel_plays: usize,
  /// Signups per contact, as a percentage.
  pub conversion_rate:   f64,
}

pub fn dashboard<Tz: TimeZone>(snapshot: &Snapshot, now: &DateTime<Tz>) -> DashboardKpis {
  let tz = now.timezone();
  let today = now.date_naive();
  let on_today = |at: &DateTime<Utc>| at.with_timezone(&tz).date_naive() == today;

  DashboardKpis {
    date:              today,
    total_contacts:    snapshot.contacts.len(),
    today_contacts:    snapshot.contacts.iter().filter(|c| on_today(&c.created_at)).count(),
    hot_leads:         snapshot
      .contacts
      .iter()
      .filter(|c| c.status == LeadStatus::Hot)
      .count(),
    total_scans:       snapshot.scans.len(),
    today_scans:       snapshot.scans.iter().filter(|s| on_today(&s.scanned_at)).count(),
    total_signups:     snapshot.signups.len(),
    today_signups:     snapshot.signups.iter().filter(|s| on_today(&s.created_at)).count(),
    total_wheel_plays: snapshot.wheel_results.len(),
    today_wheel_plays: snapshot
      .wheel_results
      .iter()
      .filter(|w| on_today(&w.created_at))
      .count(),
    conversion_rate:   percentage(snapshot.signups.len(), snapshot.contacts.len()),
  }
}
