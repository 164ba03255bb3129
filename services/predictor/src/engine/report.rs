//! Read-only summaries over the engine state

use std::collections::BTreeMap;

use crate::engine::record::{OutcomeEntry, PredictionRecord, PredictionStatus};

/// Periodic report over the most recent batch of outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub entries: Vec<OutcomeEntry>,
    pub wins: usize,
    pub total: usize,
    /// Percent, one decimal
    pub win_rate: f64,
}

/// Counts over every prediction the engine holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStats {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub pending: usize,
    pub duplicates: usize,
    /// Percent of settled (win or loss) predictions that won, one decimal
    pub win_rate: f64,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_one_decimal(part as f64 / whole as f64 * 100.0)
}

/// A digest is due whenever the log has just reached a multiple of the batch size
pub fn digest_due(log_len: usize, batch_size: usize) -> bool {
    batch_size > 0 && log_len > 0 && log_len % batch_size == 0
}

/// Digest of the last `batch_size` outcomes, or `None` if the log is empty
pub fn build_digest(outcome_log: &[OutcomeEntry], batch_size: usize) -> Option<Digest> {
    if outcome_log.is_empty() || batch_size == 0 {
        return None;
    }

    let start = outcome_log.len().saturating_sub(batch_size);
    let entries = outcome_log[start..].to_vec();
    let total = entries.len();
    let wins = entries
        .iter()
        .filter(|e| e.status == PredictionStatus::Win)
        .count();

    Some(Digest {
        win_rate: percent(wins, total),
        entries,
        wins,
        total,
    })
}

pub fn compute_stats(predictions: &BTreeMap<u32, PredictionRecord>) -> EngineStats {
    let mut stats = EngineStats {
        total: predictions.len(),
        ..Default::default()
    };

    for record in predictions.values() {
        match record.status {
            PredictionStatus::Pending => stats.pending += 1,
            PredictionStatus::Win => stats.wins += 1,
            PredictionStatus::Loss => stats.losses += 1,
            PredictionStatus::Duplicate => stats.duplicates += 1,
        }
    }

    stats.win_rate = percent(stats.wins, stats.wins + stats.losses);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize_suits;

    fn entry(game_number: u32, status: PredictionStatus) -> OutcomeEntry {
        OutcomeEntry { game_number, status }
    }

    #[test]
    fn test_digest_due() {
        assert!(!digest_due(0, 20));
        assert!(!digest_due(19, 20));
        assert!(digest_due(20, 20));
        assert!(!digest_due(21, 20));
        assert!(digest_due(40, 20));
        assert!(!digest_due(20, 0));
    }

    #[test]
    fn test_build_digest_takes_last_batch() {
        let mut log = Vec::new();
        for i in 0..25u32 {
            let status = if i % 3 == 0 { PredictionStatus::Win } else { PredictionStatus::Loss };
            log.push(entry(i * 10, status));
        }

        let digest = build_digest(&log, 20).unwrap();
        assert_eq!(digest.total, 20);
        assert_eq!(digest.entries.first().unwrap().game_number, 50);
        assert_eq!(digest.entries.last().unwrap().game_number, 240);
        // wins among i = 5..25 where i % 3 == 0: 6, 9, 12, 15, 18, 21, 24
        assert_eq!(digest.wins, 7);
        assert_eq!(digest.win_rate, 35.0);
    }

    #[test]
    fn test_win_rate_rounding() {
        let log = vec![
            entry(10, PredictionStatus::Win),
            entry(20, PredictionStatus::Loss),
            entry(30, PredictionStatus::Loss),
        ];
        let digest = build_digest(&log, 20).unwrap();
        assert_eq!(digest.win_rate, 33.3);
    }

    #[test]
    fn test_build_digest_empty() {
        assert!(build_digest(&[], 20).is_none());
    }

    #[test]
    fn test_compute_stats() {
        let mut predictions = BTreeMap::new();
        let statuses = [
            PredictionStatus::Win,
            PredictionStatus::Win,
            PredictionStatus::Loss,
            PredictionStatus::Pending,
            PredictionStatus::Duplicate,
        ];
        for (i, status) in statuses.iter().enumerate() {
            let n = (i as u32 + 1) * 10;
            let mut record = PredictionRecord::new(n, normalize_suits("♠"), n - 3);
            record.status = *status;
            predictions.insert(n, record);
        }

        let stats = compute_stats(&predictions);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.win_rate, 66.7);
    }

    #[test]
    fn test_compute_stats_empty() {
        assert_eq!(compute_stats(&BTreeMap::new()), EngineStats::default());
    }
}
