//! The story pipeline as an explicit state machine.

use serde::{Deserialize, Serialize};
use storyloom_error::{PipelineError, PipelineErrorKind};
use strum::IntoEnumIterator;

/// A step of the story pipeline, in order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Seed parameters entered, nothing generated yet
    #[default]
    Seed,
    /// Story topic
    Topic,
    /// Character sheet
    Characters,
    /// Coarse outline
    Outline,
    /// Detailed outline, expanded window by window
    DetailedOutline,
    /// Prose chapters, expanded beat by beat
    Prose,
    /// Title and teaser
    TitleTeaser,
    /// Every artifact approved
    Complete,
}

impl Stage {
    /// The stage after this one, if any.
    pub fn next(self) -> Option<Self> {
        Self::iter().skip_while(|s| *s != self).nth(1)
    }

    /// The stage before this one, if any.
    pub fn previous(self) -> Option<Self> {
        Self::iter().take_while(|s| *s != self).last()
    }

    /// Whether this stage generates a draft for review.
    pub fn produces_draft(self) -> bool {
        !matches!(self, Self::Seed | Self::Complete)
    }
}

/// A reviewer decision on the current stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Transition {
    /// Accept the draft and move to the next stage
    Approve,
    /// Discard the draft and generate it again
    Regenerate,
    /// Return to the previous stage
    Back,
}

/// Tracks the current stage and validates transitions.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::{Stage, StageMachine, Transition};
///
/// let mut machine = StageMachine::new();
/// assert_eq!(machine.apply(Transition::Approve).unwrap(), Stage::Topic);
/// assert!(machine.apply(Transition::Back).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageMachine {
    stage: Stage,
}

impl StageMachine {
    /// A machine at [`Stage::Seed`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A machine resuming at `stage`.
    pub fn starting_at(stage: Stage) -> Self {
        Self { stage }
    }

    /// The current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether every stage has been approved.
    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Complete
    }

    /// Apply `transition` and return the new stage.
    ///
    /// # Errors
    ///
    /// Approving [`Stage::Complete`], regenerating a stage without a draft,
    /// or going back from [`Stage::Topic`] or earlier is an
    /// [`InvalidTransition`](PipelineErrorKind::InvalidTransition).
    pub fn apply(&mut self, transition: Transition) -> Result<Stage, PipelineError> {
        let target = match transition {
            Transition::Approve => self.stage.next(),
            Transition::Regenerate => self.stage.produces_draft().then_some(self.stage),
            Transition::Back => self
                .stage
                .previous()
                .filter(|previous| *previous > Stage::Seed),
        };

        let target = target.ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::InvalidTransition {
                stage: self.stage.to_string(),
                transition: transition.to_string(),
            })
        })?;

        tracing::debug!(from = %self.stage, to = %target, %transition, "Stage transition");
        self.stage = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_previous() {
        assert_eq!(Stage::Seed.next(), Some(Stage::Topic));
        assert_eq!(Stage::TitleTeaser.next(), Some(Stage::Complete));
        assert_eq!(Stage::Complete.next(), None);
        assert_eq!(Stage::Seed.previous(), None);
        assert_eq!(Stage::Prose.previous(), Some(Stage::DetailedOutline));
    }

    #[test]
    fn test_stage_names_round_trip_through_strum() {
        assert_eq!(Stage::DetailedOutline.to_string(), "detailed_outline");
        assert_eq!("title_teaser".parse::<Stage>().unwrap(), Stage::TitleTeaser);
    }
}
