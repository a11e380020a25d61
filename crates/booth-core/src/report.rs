//! Daily, event and ROI reports.
//!
//! Each report is a pure projection over a [`Snapshot`]. The caller supplies
//! the clock and the business assumptions.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{LeadStatus, Snapshot},
  scans::{QrRanking, percentage, round2, top_qr_codes},
};

/// Number of QR codes listed in the event report.
pub const EVENT_TOP_QR_CODES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
  Daily,
  Event,
  Roi,
}

impl FromStr for ReportKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "daily" => Ok(Self::Daily),
      "event" => Ok(Self::Event),
      "roi" => Ok(Self::Roi),
      other => Err(Error::UnknownReportKind(other.to_owned())),
    }
  }
}

// ─── Daily ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
  pub date:            NaiveDate,
  pub total_contacts:  usize,
  pub total_scans:     usize,
  pub total_signups:   usize,
  /// Signups per contact, as a percentage.
  pub conversion_rate: f64,
}

pub fn daily<Tz: TimeZone>(snapshot: &Snapshot, now: &DateTime<Tz>) -> DailyReport {
  let contacts = snapshot.contacts.len();
  let signups = snapshot.signups.len();
  DailyReport {
    date:            now.date_naive(),
    total_contacts:  contacts,
    total_scans:     snapshot.scans.len(),
    total_signups:   signups,
    conversion_rate: percentage(signups, contacts),
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeadDistribution {
  pub hot:  usize,
  pub warm: usize,
  pub cold: usize,
}

impl LeadDistribution {
  pub fn tally(statuses: impl IntoIterator<Item = LeadStatus>) -> Self {
    statuses.into_iter().fold(Self::default(), |mut acc, status| {
      match status {
        LeadStatus::Hot => acc.hot += 1,
        LeadStatus::Warm => acc.warm += 1,
        LeadStatus::Cold => acc.cold += 1,
      }
      acc
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
  pub total_contacts:    usize,
  pub total_scans:       usize,
  pub total_signups:     usize,
  pub lead_distribution: LeadDistribution,
  pub top_qr_codes:      Vec<QrRanking>,
}

pub fn event(snapshot: &Snapshot) -> EventReport {
  EventReport {
    total_contacts:    snapshot.contacts.len(),
    total_scans:       snapshot.scans.len(),
    total_signups:     snapshot.signups.len(),
    lead_distribution: LeadDistribution::tally(
      snapshot.contacts.iter().map(|c| c.status),
    ),
    top_qr_codes:      top_qr_codes(&snapshot.qr_codes, EVENT_TOP_QR_CODES),
  }
}

// ─── ROI ─────────────────────────────────────────────────────────────────────

/// Business constants for the ROI estimate. These are configuration, never
/// computed from the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiAssumptions {
  /// Revenue brought by one converted customer.
  pub average_customer_value: f64,
  /// Fraction of leads expected to become customers, e.g. `0.10`.
  pub conversion_rate:        f64,
  /// Acquisition cost of a single lead.
  pub cost_per_lead:          f64,
}

impl Default for RoiAssumptions {
  fn default() -> Self {
    Self {
      average_customer_value: 500.0,
      conversion_rate:        0.10,
      cost_per_lead:          25.0,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiReport {
  pub total_contacts:      usize,
  pub estimated_customers: u64,
  pub estimated_revenue:   f64,
  pub total_cost:          f64,
  pub roi_percent:         f64,
  pub assumptions:         RoiAssumptions,
}

/// Estimate return on the event's lead-acquisition spend.
///
/// Fails with [`Error::EmptyReportBase`] when there are no contacts (or the
/// configured cost per lead is not positive), since the ratio is undefined.
pub fn roi(snapshot: &Snapshot, assumptions: RoiAssumptions) -> Result<RoiReport> {
  let contacts = snapshot.contacts.len();
  if contacts == 0 {
    return Err(Error::EmptyReportBase("roi report needs at least one contact"));
  }
  if assumptions.cost_per_lead <= 0.0 {
    return Err(Error::EmptyReportBase("cost per lead must be positive"));
  }

  let estimated_customers =
    (contacts as f64 * assumptions.conversion_rate).round().max(0.0) as u64;
  let estimated_revenue =
    estimated_customers as f64 * assumptions.average_customer_value;
  let total_cost = contacts as f64 * assumptions.cost_per_lead;

  Ok(RoiReport {
    total_contacts: contacts,
    estimated_customers,
    estimated_revenue: round2(estimated_revenue),
    total_cost: round2(total_cost),
    roi_percent: round2(estimated_revenue / total_cost * 100.0),
    assumptions,
  })
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Any of the three reports, serialised untagged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
  Daily(DailyReport),
  Event(EventReport),
  Roi(RoiReport),
}

pub fn generate<Tz: TimeZone>(
  kind: ReportKind,
  snapshot: &Snapshot,
  now: &DateTime<Tz>,
  assumptions: RoiAssumptions,
) -> Result<Report> {
  Ok(match kind {
    ReportKind::Daily => Report::Daily(daily(snapshot, now)),
    ReportKind::Event => Report::Event(event(snapshot)),
    ReportKind::Roi => Report::Roi(roi(snapshot, assumptions)?),
  })
}

#[cfg(test)]
mod tests {
  use chrono::{FixedOffset, TimeZone, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::record::{
    CallbackPreference, Contact, LoummelSignup, NewContact, QrCode, QrKind,
  };

  fn contact(pref: Option<CallbackPreference>) -> Contact {
    let mut input = NewContact::new("Lead", "lead@example.com", "0");
    input.callback_preference = pref;
    Contact::from_new(Uuid::new_v4(), input, Utc::now())
  }

  fn signup() -> LoummelSignup {
    LoummelSignup {
      id:         Uuid::new_v4(),
      name:       "S".into(),
      email:      format!("{}@example.com", Uuid::new_v4()),
      phone:      "0".into(),
      promo_code: "LOUMMEL-AAAAAA".into(),
      created_at: Utc::now(),
    }
  }

  fn qr(name: &str, scan_count: u64) -> QrCode {
    QrCode {
      id: Uuid::new_v4(),
      name: name.into(),
      kind: QrKind::Game,
      url: "https://x".into(),
      scan_count,
      active: true,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn report_kind_parses_known_names_only() {
    assert_eq!("daily".parse::<ReportKind>().unwrap(), ReportKind::Daily);
    assert_eq!("event".parse::<ReportKind>().unwrap(), ReportKind::Event);
    assert_eq!("roi".parse::<ReportKind>().unwrap(), ReportKind::Roi);
    assert!(matches!(
      "weekly".parse::<ReportKind>(),
      Err(Error::UnknownReportKind(k)) if k == "weekly"
    ));
  }

  #[test]
  fn daily_report_uses_local_date_and_signup_ratio() {
    let snapshot = Snapshot {
      contacts: vec![contact(None), contact(None), contact(None)],
      signups: vec![signup()],
      ..Snapshot::default()
    };
    // 23:30 UTC is already the next day at UTC+2.
    let tz = FixedOffset::east_opt(2 * 3600).unwrap();
    let now = Utc
      .with_ymd_and_hms(2026, 3, 9, 23, 30, 0)
      .unwrap()
      .with_timezone(&tz);

    let report = daily(&snapshot, &now);
    assert_eq!(report.date, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    assert_eq!(report.total_contacts, 3);
    assert_eq!(report.total_signups, 1);
    assert_eq!(report.conversion_rate, 33.33);
  }

  #[test]
  fn daily_report_with_no_contacts_has_zero_rate() {
    let snapshot = Snapshot { signups: vec![signup()], ..Snapshot::default() };
    assert_eq!(daily(&snapshot, &Utc::now()).conversion_rate, 0.0);
  }

  #[test]
  fn event_report_distributes_leads_and_ranks_top_five() {
    let snapshot = Snapshot {
      contacts: vec![
        contact(Some(CallbackPreference::Urgent)),
        contact(Some(CallbackPreference::Within48h)),
        contact(Some(CallbackPreference::Within48h)),
        contact(None),
      ],
      qr_codes: (0..7).map(|i| qr(&format!("qr{i}"), i)).collect(),
      ..Snapshot::default()
    };
    let report = event(&snapshot);
    assert_eq!(report.lead_distribution, LeadDistribution { hot: 1, warm: 2, cold: 1 });
    assert_eq!(report.top_qr_codes.len(), 5);
    assert_eq!(report.top_qr_codes[0].name, "qr6");
    assert_eq!(report.top_qr_codes[4].name, "qr2");
  }

  #[test]
  fn roi_formula() {
    let snapshot = Snapshot {
      contacts: (0..24).map(|_| contact(None)).collect(),
      ..Snapshot::default()
    };
    let report = roi(&snapshot, RoiAssumptions {
      average_customer_value: 1000.0,
      conversion_rate:        0.1,
      cost_per_lead:          50.0,
    })
    .unwrap();
    // 24 * 0.1 = 2.4 -> 2 customers; 2000 / 1200 * 100.
    assert_eq!(report.estimated_customers, 2);
    assert_eq!(report.estimated_revenue, 2000.0);
    assert_eq!(report.total_cost, 1200.0);
    assert_eq!(report.roi_percent, 166.67);
  }

  #[test]
  fn roi_without_contacts_is_rejected() {
    let err = roi(&Snapshot::default(), RoiAssumptions::default()).unwrap_err();
    assert!(matches!(err, Error::EmptyReportBase(_)));
  }

  #[test]
  fn roi_with_free_leads_is_rejected() {
    let snapshot = Snapshot { contacts: vec![contact(None)], ..Snapshot::default() };
    let assumptions = RoiAssumptions { cost_per_lead: 0.0, ..RoiAssumptions::default() };
    assert!(matches!(roi(&snapshot, assumptions), Err(Error::EmptyReportBase(_))));
  }
}
