//! Mastery model: turns one answer event into an updated topic snapshot.
//!
//! The update is pure and total. It applies, in order: passive decay since the
//! topic was last seen, a base delta scaled by difficulty, streak bookkeeping
//! with its bonus/penalty, the `[0, 100]` clamp, and the mastered flag.

use chrono::{DateTime, Utc};

use crate::model::{Difficulty, TopicSnapshot};

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Tunable pedagogy knobs for the mastery model.
///
/// `MasteryPolicy::default()` holds the production values.
#[derive(Debug, Clone, PartialEq)]
pub struct MasteryPolicy {
    pub correct_delta: f64,
    pub wrong_delta: f64,

    pub easy_multiplier: f64,
    pub medium_multiplier: f64,
    pub hard_multiplier: f64,

    pub correct_streak_bonus_every: u32,
    pub correct_streak_bonus: f64,
    pub wrong_streak_penalty_every: u32,
    pub wrong_streak_penalty: f64,

    /// Whole days without practice before decay starts.
    pub decay_grace_days: i64,
    /// Per-day loss between the grace period and `decay_heavy_after_days`.
    pub decay_medium_rate: f64,
    pub decay_heavy_after_days: i64,
    /// Per-day loss past `decay_heavy_after_days`.
    pub decay_heavy_rate: f64,
    /// Decay never takes mastery below this value.
    pub passive_floor: f64,

    pub mastered_threshold: f64,
    pub unmastered_below: f64,
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            correct_delta: 5.0,
            wrong_delta: -7.0,
            easy_multiplier: 0.6,
            medium_multiplier: 1.0,
            hard_multiplier: 1.4,
            correct_streak_bonus_every: 3,
            correct_streak_bonus: 2.0,
            wrong_streak_penalty_every: 2,
            wrong_streak_penalty: 3.0,
            decay_grace_days: 7,
            decay_medium_rate: 0.3,
            decay_heavy_after_days: 30,
            decay_heavy_rate: 0.7,
            passive_floor: 20.0,
            mastered_threshold: 100.0,
            unmastered_below: 90.0,
        }
    }
}

impl MasteryPolicy {
    #[must_use]
    pub fn base_delta(&self, was_correct: bool) -> f64 {
        if was_correct {
            self.correct_delta
        } else {
            self.wrong_delta
        }
    }

    /// Unrecognized difficulty levels are scored as medium.
    #[must_use]
    pub fn difficulty_multiplier(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::EASY => self.easy_multiplier,
            Difficulty::HARD => self.hard_multiplier,
            _ => self.medium_multiplier,
        }
    }

    #[must_use]
    pub fn streak_bonus(&self, correct_streak: u32) -> f64 {
        if every(correct_streak, self.correct_streak_bonus_every) {
            self.correct_streak_bonus
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn streak_penalty(&self, wrong_streak: u32) -> f64 {
        if every(wrong_streak, self.wrong_streak_penalty_every) {
            self.wrong_streak_penalty
        } else {
            0.0
        }
    }

    /// Mastery after `days` whole days without practice.
    #[must_use]
    pub fn decay(&self, mastery: f64, days: i64) -> f64 {
        if days <= self.decay_grace_days {
            return mastery;
        }

        let decayed = if days <= self.decay_heavy_after_days {
            mastery - (days - self.decay_grace_days) as f64 * self.decay_medium_rate
        } else {
            mastery
                - (self.decay_heavy_after_days - self.decay_grace_days) as f64
                    * self.decay_medium_rate
                - (days - self.decay_heavy_after_days) as f64 * self.decay_heavy_rate
        };

        decayed.max(self.passive_floor)
    }

    /// Two-threshold mastered test.
    ///
    /// With mastery clamped to 100 the lower threshold never changes the result;
    /// both are kept so a smoothed or unclamped mastery scale can use the band.
    #[must_use]
    pub fn mastered_flag(&self, mastery: f64) -> bool {
        let mut mastered = mastery >= self.mastered_threshold;
        if mastery < self.unmastered_below {
            mastered = false;
        }
        mastered
    }
}

fn every(streak: u32, period: u32) -> bool {
    period > 0 && streak > 0 && streak % period == 0
}

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

/// A single answered question, as seen by the mastery model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasteryInput {
    pub was_correct: bool,
    pub difficulty: Difficulty,
    /// Becomes the snapshot's `last_seen`.
    pub answered_at: DateTime<Utc>,
    /// Reference time for decay.
    pub current_time: DateTime<Utc>,
}

impl MasteryInput {
    /// Input for an answer given right now.
    #[must_use]
    pub fn at(was_correct: bool, difficulty: Difficulty, now: DateTime<Utc>) -> Self {
        Self {
            was_correct,
            difficulty,
            answered_at: now,
            current_time: now,
        }
    }
}

//
// ─── MODEL ─────────────────────────────────────────────────────────────────────
//

/// Mastery model bound to a policy.
#[derive(Debug, Clone, Default)]
pub struct MasteryModel {
    policy: MasteryPolicy,
}

impl MasteryModel {
    #[must_use]
    pub fn new(policy: MasteryPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &MasteryPolicy {
        &self.policy
    }

    /// Mastery after passive decay only. Topics never seen do not decay.
    #[must_use]
    pub fn decayed_mastery(&self, current: &TopicSnapshot, now: DateTime<Utc>) -> f64 {
        match current.last_seen() {
            None => current.mastery(),
            Some(last_seen) => {
                // Whole days, truncated toward zero.
                let days = (now - last_seen).num_hours() / 24;
                self.policy.decay(current.mastery(), days)
            }
        }
    }

    /// Apply one answer to a snapshot.
    #[must_use]
    pub fn update(&self, current: &TopicSnapshot, input: &MasteryInput) -> TopicSnapshot {
        let policy = &self.policy;
        let decayed = self.decayed_mastery(current, input.current_time);

        let mut delta =
            policy.base_delta(input.was_correct) * policy.difficulty_multiplier(input.difficulty);

        let (correct_streak, wrong_streak) = if input.was_correct {
            (current.correct_streak().saturating_add(1), 0)
        } else {
            (0, current.wrong_streak().saturating_add(1))
        };

        delta += policy.streak_bonus(correct_streak);
        delta -= policy.streak_penalty(wrong_streak);

        let mastery = (decayed + delta).clamp(0.0, 100.0);

        TopicSnapshot::from_update(
            current.topic_id().clone(),
            mastery,
            correct_streak,
            wrong_streak,
            policy.mastered_flag(mastery),
            input.answered_at,
        )
    }
}

/// Apply one answer using the default policy.
#[must_use]
pub fn update_mastery(current: &TopicSnapshot, input: &MasteryInput) -> TopicSnapshot {
    MasteryModel::default().update(current, input)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
