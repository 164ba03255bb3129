//! Text the display channel sees

use crate::engine::record::{PredictionStatus, VerdictDetail};
use crate::engine::report::Digest;

pub const PENDING_MARKER: &str = "⏳";
pub const LOSS_MARKER: &str = "❌❌";
pub const DUPLICATE_MARKER: &str = "🔄";

/// Win marker carries the verification offset as a keycap digit (`✅3️⃣`)
pub fn win_marker(verification_offset: u32) -> String {
    if verification_offset < 10 {
        format!("✅{}\u{FE0F}\u{20E3}", verification_offset)
    } else {
        "✅".to_string()
    }
}

pub fn status_marker(status: PredictionStatus, verification_offset: u32) -> String {
    match status {
        PredictionStatus::Pending => PENDING_MARKER.to_string(),
        PredictionStatus::Win => win_marker(verification_offset),
        PredictionStatus::Loss => LOSS_MARKER.to_string(),
        PredictionStatus::Duplicate => DUPLICATE_MARKER.to_string(),
    }
}

fn prediction_line(game_number: u32, marker: &str) -> String {
    format!("🔵{}— JOKER 2D| {}", game_number, marker)
}

pub fn render_prediction(game_number: u32) -> String {
    prediction_line(game_number, PENDING_MARKER)
}

pub fn render_status(
    game_number: u32,
    status: PredictionStatus,
    verification_offset: u32,
) -> String {
    prediction_line(game_number, &status_marker(status, verification_offset))
}

/// Malformed reveals always render the two-part loss marker, whatever
/// the status says.
pub fn render_verdict(
    game_number: u32,
    status: PredictionStatus,
    detail: VerdictDetail,
    verification_offset: u32,
) -> String {
    match detail {
        VerdictDetail::MalformedReveal { .. } => prediction_line(game_number, LOSS_MARKER),
        _ => render_status(game_number, status, verification_offset),
    }
}

pub fn render_digest(digest: &Digest, verification_offset: u32) -> String {
    let mut text = format!("📊 Bilan des {} dernières prédictions :\n", digest.total);
    for entry in &digest.entries {
        text.push_str(&format!(
            "🔵{}📌 D🔵 statut :{}\n",
            entry.game_number,
            status_marker(entry.status, verification_offset)
        ));
    }
    text.push_str(&format!(
        "\n📈 Statistiques: {}/{} ({:.1}% de réussite)",
        digest.wins, digest.total, digest.win_rate
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::record::OutcomeEntry;

    #[test]
    fn test_render_prediction() {
        assert_eq!(render_prediction(50), "🔵50— JOKER 2D| ⏳");
    }

    #[test]
    fn test_render_verdicts() {
        let win = render_verdict(50, PredictionStatus::Win, VerdictDetail::Matched { group: 1 }, 3);
        assert_eq!(win, "🔵50— JOKER 2D| ✅3\u{FE0F}\u{20E3}");

        let loss = render_verdict(50, PredictionStatus::Loss, VerdictDetail::NoMatch, 3);
        assert_eq!(loss, "🔵50— JOKER 2D| ❌❌");

        let malformed = render_verdict(
            60,
            PredictionStatus::Loss,
            VerdictDetail::MalformedReveal { first: 1, second: 2 },
            3,
        );
        assert!(malformed.ends_with(LOSS_MARKER));
    }

    #[test]
    fn test_render_digest() {
        let digest = Digest {
            entries: vec![
                OutcomeEntry { game_number: 10, status: PredictionStatus::Win },
                OutcomeEntry { game_number: 20, status: PredictionStatus::Loss },
            ],
            wins: 1,
            total: 2,
            win_rate: 50.0,
        };
        let text = render_digest(&digest, 3);
        assert!(text.starts_with("📊 Bilan des 2 dernières prédictions"));
        assert!(text.contains("🔵20📌 D🔵 statut :❌❌"));
        assert!(text.ends_with("1/2 (50.0% de réussite)"));
    }
}
