//! Scan aggregation: per-code conversion stats and the top-N ranking.

use serde::Serialize;
use uuid::Uuid;

use crate::record::{QrCode, Scan};

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// `part / whole * 100`, rounded to two decimals; `0` when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
  if whole == 0 {
    return 0.0;
  }
  round2(part as f64 / whole as f64 * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanStats {
  pub total_scans:     usize,
  pub conversions:     usize,
  pub conversion_rate: f64,
}

/// Conversion stats for one QR code, counted from the scan log.
pub fn stats_for(qr_code_id: Uuid, scans: &[Scan]) -> ScanStats {
  let (total_scans, conversions) = scans
    .iter()
    .filter(|s| s.qr_code_id == qr_code_id)
    .fold((0, 0), |(total, converted), s| {
      (total + 1, converted + usize::from(s.converted))
    });

  ScanStats {
    total_scans,
    conversions,
    conversion_rate: percentage(conversions, total_scans),
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrRanking {
  pub name:  String,
  pub scans: u64,
}

/// The `n` most-scanned codes. Ties keep insertion order.
pub fn top_qr_codes(codes: &[QrCode], n: usize) -> Vec<QrRanking> {
  let mut ranked: Vec<&QrCode> = codes.iter().collect();
  // `sort_by` is stable.
  ranked.sort_by(|a, b| b.scan_count.cmp(&a.scan_count));
  ranked
    .into_iter()
    .take(n)
    .map(|qr| QrRanking { name: qr.name.clone(), scans: qr.scan_count })
    .collect()
}
