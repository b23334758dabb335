//! Frequency and cumulative-share aggregation (Pareto 80/20 analysis).

use std::collections::HashMap;

use chrono::Datelike;

use crate::model::{IncidentRecord, ParetoResult, ParetoRow};

/// Counts per key in descending-count order. Ties break by first-seen order
/// in the input, so repeated runs over identical input are deterministic.
pub fn frequency<I, S>(keys: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for key in keys {
        let key = key.as_ref();
        match counts.get_mut(key) {
            Some(n) => *n += 1,
            None => {
                first_seen.push(key.to_string());
                counts.insert(key.to_string(), 1);
            }
        }
    }

    let rank: HashMap<&str, usize> = first_seen
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();

    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| rank[a.0.as_str()].cmp(&rank[b.0.as_str()])));
    out
}

/// Cumulative-share analysis over a sequence of group keys.
///
/// `cumulative_share(k)` is the inclusive prefix sum of the top-(k+1) counts
/// over the grand total; `threshold_index` is the smallest rank whose share
/// reaches `threshold` (inclusive comparison, so an exact match lands inside
/// the threshold set). Empty input yields `threshold_index = None`.
pub fn pareto<I, S>(keys: I, threshold: f64) -> ParetoResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let counts = frequency(keys);
    let total: usize = counts.iter().map(|(_, n)| n).sum();

    let mut rows = Vec::with_capacity(counts.len());
    let mut running = 0usize;
    let mut threshold_index = None;

    for (i, (key, count)) in counts.into_iter().enumerate() {
        // Within the threshold set = at or before the crossing rank
        let within_threshold = threshold_index.is_none();
        running += count;
        let share = running as f64 / total as f64;
        if threshold_index.is_none() && share >= threshold {
            threshold_index = Some(i);
        }
        rows.push(ParetoRow {
            key,
            count,
            cumulative_share: share,
            within_threshold,
        });
    }

    ParetoResult {
        rows,
        total,
        threshold,
        threshold_index,
    }
}

/// Incident counts per calendar month (`YYYY-MM`), chronological. Records
/// without a valid date are skipped.
pub fn count_by_month(records: &[IncidentRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<(i32, u32), usize> = HashMap::new();
    for record in records {
        if let Some(date) = record.incident_date {
            *counts.entry((date.year(), date.month())).or_insert(0) += 1;
        }
    }

    let mut out: Vec<((i32, u32), usize)> = counts.into_iter().collect();
    out.sort_by_key(|(ym, _)| *ym);
    out.into_iter()
        .map(|((year, month), n)| (format!("{year}-{month:02}"), n))
        .collect()
}
