//! Prize-wheel statistics.

use serde::Serialize;

use crate::record::WheelResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrizeCount {
  pub prize: String,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WheelStats {
  pub total_plays: usize,
  pub prizes:      Vec<PrizeCount>,
}

/// Per-prize distribution, most frequent first; ties by first appearance.
pub fn prize_distribution(results: &[WheelResult]) -> WheelStats {
  let mut prizes: Vec<PrizeCount> = Vec::new();
  for result in results {
    match prizes.iter_mut().find(|p| p.prize == result.prize) {
      Some(entry) => entry.count += 1,
      None => prizes.push(PrizeCount { prize: result.prize.clone(), count: 1 }),
    }
  }
  prizes.sort_by(|a, b| b.count.cmp(&a.count));

  WheelStats { total_plays: results.len(), prizes }
}
