//! Prediction state machine
//!
//! Every announcement goes through two independent checks. The trigger
//! check may open a prediction for the next round (the next game number
//! ending in 0); the verification check may settle the pending prediction
//! whose triggering game sits exactly `verification_offset` games back.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::engine::actions::EngineAction;
use crate::engine::record::*;
use crate::engine::render::{render_digest, render_prediction, render_status, render_verdict};
use crate::engine::report::{build_digest, compute_stats, digest_due, Digest, EngineStats};
use crate::engine::state::{EngineSettings, EngineState};
use crate::parser::*;

/// Smallest multiple of 10 strictly greater than `game_number`
pub fn next_round_game(game_number: u32) -> Option<u32> {
    (game_number / 10).checked_add(1)?.checked_mul(10)
}

/// Settle a prediction against the first two revealed hands.
///
/// Both hands must hold exactly two cards; anything else is a loss.
/// Otherwise it is a win when the predicted suits all appear in either hand.
pub fn judge_reveal(predicted: &SuitSet, groups: &[String]) -> (PredictionStatus, VerdictDetail) {
    let (first, second) = match (groups.first(), groups.get(1)) {
        (Some(first), Some(second)) => (first, second),
        _ => return (PredictionStatus::Loss, VerdictDetail::NoMatch),
    };

    let first_count = count_suit_symbols(first);
    let second_count = count_suit_symbols(second);
    if first_count != 2 || second_count != 2 {
        return (
            PredictionStatus::Loss,
            VerdictDetail::MalformedReveal {
                first: first_count,
                second: second_count,
            },
        );
    }

    for (group, hand) in [first, second].into_iter().enumerate() {
        if predicted.is_subset(&normalize_suits(hand)) {
            return (PredictionStatus::Win, VerdictDetail::Matched { group });
        }
    }

    (PredictionStatus::Loss, VerdictDetail::NoMatch)
}

/// What the trigger check did with an announcement
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    Created(PredictionRecord),
    /// Same text seen again; the prediction it produced is now `Duplicate`
    MarkedDuplicate(u32),
    Skipped,
}

pub struct Engine {
    settings: EngineSettings,
    state: EngineState,
    dirty: bool,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_state(settings, EngineState::default())
    }

    pub fn with_state(settings: EngineSettings, state: EngineState) -> Self {
        info!(
            "Prediction engine ready: triggers={:?}, verification offset={}, {} restored",
            settings.trigger_offsets,
            settings.verification_offset,
            state.predictions.len()
        );
        Self {
            settings,
            state,
            dirty: false,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// True once after any state change since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Process one announcement end to end and return what to send
    pub fn ingest(
        &mut self,
        raw_text: &str,
        origin: ChannelId,
        is_edit: bool,
    ) -> Vec<EngineAction> {
        let mut actions = Vec::new();

        if let Some(stats_channel) = self.settings.stats_channel {
            if origin != stats_channel {
                debug!("Ignoring channel {} (stats channel is {})", origin, stats_channel);
                return actions;
            }
        }

        let parsed = parse_announcement(raw_text);
        let phase = detect_phase(raw_text);

        if is_edit && phase == AnnouncementPhase::Plain {
            debug!("Ignoring edit without lifecycle marker");
            return actions;
        }

        if let Some(game_number) = parsed.game_number {
            self.log_processed(game_number, origin, is_edit);
        }

        if self.settings.two_phase_edits && phase == AnnouncementPhase::Provisional {
            if let Some(game_number) = parsed.game_number {
                self.state
                    .pending_edit_markers
                    .insert(game_number, raw_text.to_string());
                self.dirty = true;
                info!("Game #{} is provisional, waiting for final edit", game_number);
            }
            return actions;
        }

        if self.admit_for_prediction(&parsed, phase) {
            match self.evaluate_trigger(&parsed, raw_text) {
                TriggerOutcome::Created(record) => {
                    actions.push(EngineAction::Publish {
                        predicted_game_number: record.predicted_game_number,
                        text: render_prediction(record.predicted_game_number),
                    });
                }
                TriggerOutcome::MarkedDuplicate(game_number) => {
                    if let Some(msg) = self.message_ref(game_number) {
                        actions.push(EngineAction::EditMessage {
                            channel: msg.channel,
                            message_id: msg.message_id,
                            new_text: render_status(
                                game_number,
                                PredictionStatus::Duplicate,
                                self.settings.verification_offset,
                            ),
                        });
                    }
                }
                TriggerOutcome::Skipped => {}
            }
        }

        // A provisional reveal may still change; only the final line settles
        if phase == AnnouncementPhase::Provisional {
            debug!("Provisional line, verification deferred");
            return actions;
        }

        if let Some(verdict) = self.verify(&parsed) {
            match self.message_ref(verdict.predicted_game_number) {
                Some(msg) => actions.push(EngineAction::EditMessage {
                    channel: msg.channel,
                    message_id: msg.message_id,
                    new_text: render_verdict(
                        verdict.predicted_game_number,
                        verdict.status,
                        verdict.detail,
                        self.settings.verification_offset,
                    ),
                }),
                None => warn!(
                    "Prediction #{} settled as {:?} but was never published",
                    verdict.predicted_game_number, verdict.status
                ),
            }

            if let Some(digest) = self.latest_digest() {
                info!(
                    "Digest due: {}/{} wins ({:.1}%)",
                    digest.wins, digest.total, digest.win_rate
                );
                actions.push(EngineAction::PublishDigest {
                    text: render_digest(&digest, self.settings.verification_offset),
                });
            }
        }

        actions
    }

    fn log_processed(&mut self, game_number: u32, origin: ChannelId, is_edit: bool) {
        let limit = self.settings.processed_log_limit;
        if limit == 0 {
            return;
        }
        let log = &mut self.state.processed_log;
        log.push_back(ProcessedAnnouncement {
            game_number,
            channel: origin,
            is_edit,
            received_at: Utc::now(),
        });
        while log.len() > limit {
            log.pop_front();
        }
        self.dirty = true;
    }

    /// In two-phase mode a parked game only predicts from its finalizing
    /// edit. Games that were never parked go through as usual.
    fn admit_for_prediction(
        &mut self,
        parsed: &ParsedAnnouncement,
        phase: AnnouncementPhase,
    ) -> bool {
        if !self.settings.two_phase_edits {
            return true;
        }
        let Some(game_number) = parsed.game_number else {
            return true;
        };
        if !self.state.pending_edit_markers.contains_key(&game_number) {
            return true;
        }

        if phase == AnnouncementPhase::Finalized {
            self.state.pending_edit_markers.remove(&game_number);
            self.dirty = true;
            info!("Game #{} finalized", game_number);
            true
        } else {
            debug!("Game #{} still awaiting final edit", game_number);
            false
        }
    }

    /// Open a prediction if this announcement arms one
    pub fn should_predict(
        &mut self,
        parsed: &ParsedAnnouncement,
        raw_text: &str,
    ) -> Option<PredictionRecord> {
        match self.evaluate_trigger(parsed, raw_text) {
            TriggerOutcome::Created(record) => Some(record),
            _ => None,
        }
    }

    pub fn evaluate_trigger(
        &mut self,
        parsed: &ParsedAnnouncement,
        raw_text: &str,
    ) -> TriggerOutcome {
        let Some(game_number) = parsed.game_number else {
            return TriggerOutcome::Skipped;
        };

        if self.state.predictions.contains_key(&game_number) {
            debug!("Game #{} already decided", game_number);
            return TriggerOutcome::Skipped;
        }

        let last_digit = (game_number % 10) as u8;
        if !self.settings.trigger_offsets.contains(&last_digit) {
            debug!("Game #{} does not trigger (last digit {})", game_number, last_digit);
            return TriggerOutcome::Skipped;
        }

        let suits = match parsed.first_group() {
            Some(group) => normalize_suits(group),
            None => {
                debug!("Game #{} has no hand group", game_number);
                return TriggerOutcome::Skipped;
            }
        };
        if suits.is_empty() {
            debug!("Game #{} first hand has no suits", game_number);
            return TriggerOutcome::Skipped;
        }

        let Some(predicted_game_number) = next_round_game(game_number) else {
            return TriggerOutcome::Skipped;
        };

        let message_fingerprint = fingerprint(raw_text);
        if self.state.seen_message_fingerprints.contains(&message_fingerprint) {
            if let Some(record) = self.state.predictions.get_mut(&predicted_game_number) {
                if record.resolve(PredictionStatus::Duplicate) {
                    self.dirty = true;
                    info!(
                        "Game #{} repeated, prediction #{} marked duplicate",
                        game_number, predicted_game_number
                    );
                    return TriggerOutcome::MarkedDuplicate(predicted_game_number);
                }
            }
            debug!("Game #{} text already processed", game_number);
            return TriggerOutcome::Skipped;
        }

        if self.state.predictions.contains_key(&predicted_game_number) {
            debug!("Game #{} already predicted from another trigger", predicted_game_number);
            return TriggerOutcome::Skipped;
        }

        let record = PredictionRecord::new(predicted_game_number, suits, game_number);
        self.state
            .predictions
            .insert(predicted_game_number, record.clone());
        self.state.seen_message_fingerprints.insert(message_fingerprint);
        self.dirty = true;

        info!(
            "Prediction created: game #{} -> {} (from #{})",
            predicted_game_number, record.predicted_suits, game_number
        );
        TriggerOutcome::Created(record)
    }

    /// Settle the pending prediction this announcement reveals, if any.
    ///
    /// Needs at least two hand groups; shorter lines are not results.
    pub fn verify(&mut self, parsed: &ParsedAnnouncement) -> Option<Verdict> {
        if parsed.symbol_groups.len() < 2 {
            return None;
        }
        let game_number = parsed.game_number?;
        let offset = self.settings.verification_offset;

        let record = self.state.predictions.values_mut().find(|r| {
            r.status == PredictionStatus::Pending
                && r.source_game_number.checked_add(offset) == Some(game_number)
        })?;

        let (status, detail) = judge_reveal(&record.predicted_suits, &parsed.symbol_groups);
        record.resolve(status);
        let predicted_game_number = record.predicted_game_number;

        self.state.outcome_log.push(OutcomeEntry {
            game_number: predicted_game_number,
            status,
        });
        self.dirty = true;

        match detail {
            VerdictDetail::MalformedReveal { first, second } => info!(
                "Prediction #{} lost on malformed reveal ({}+{} cards)",
                predicted_game_number, first, second
            ),
            _ => info!(
                "Prediction #{} settled at game #{}: {:?} ({:?})",
                predicted_game_number, game_number, status, detail
            ),
        }

        Some(Verdict {
            predicted_game_number,
            status,
            detail,
        })
    }

    /// Remember where a prediction was published. False if it is unknown.
    pub fn record_published(
        &mut self,
        predicted_game_number: u32,
        channel: ChannelId,
        message_id: MessageId,
    ) -> bool {
        match self.state.predictions.get_mut(&predicted_game_number) {
            Some(record) => {
                record.outgoing_message_ref = Some(MessageRef { channel, message_id });
                self.dirty = true;
                true
            }
            None => {
                warn!(
                    "Published message {} for unknown prediction #{}",
                    message_id, predicted_game_number
                );
                false
            }
        }
    }

    fn message_ref(&self, predicted_game_number: u32) -> Option<MessageRef> {
        self.state
            .predictions
            .get(&predicted_game_number)
            .and_then(|r| r.outgoing_message_ref)
    }

    pub fn snapshot_stats(&self) -> EngineStats {
        compute_stats(&self.state.predictions)
    }

    /// The current batch digest, only while the outcome log sits exactly on a batch boundary
    pub fn latest_digest(&self) -> Option<Digest> {
        let batch = self.settings.report_batch_size;
        if !digest_due(self.state.outcome_log.len(), batch) {
            return None;
        }
        build_digest(&self.state.outcome_log, batch)
    }

    pub fn reset(&mut self) {
        self.state.clear();
        self.dirty = true;
        info!("Prediction state reset");
    }

    /// Drop settled predictions created before `cutoff`. Pending ones stay.
    pub fn prune_resolved_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.state.predictions.len();
        self.state
            .predictions
            .retain(|_, r| !(r.status.is_terminal() && r.created_at < cutoff));
        let removed = before - self.state.predictions.len();
        if removed > 0 {
            self.dirty = true;
            info!("Pruned {} settled predictions older than {}", removed, cutoff);
        }
        removed
    }
}
