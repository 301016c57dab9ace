//! # Vote State Machine
//!
//! Pure decision table over (stored vote, requested vote). The surprising
//! part of the contract, kept on purpose: casting the opposite vote removes
//! the stored vote entirely instead of flipping it, reflecting a toggle UI
//! where a second tap always clears the prior choice.

use domains::Vote;

/// What the store should do with the (post, user) vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    /// No stored vote yet: insert the requested one.
    Insert,
    /// Stored vote differs from the requested one: remove it.
    Remove,
    /// Stored vote equals the requested one: leave state unchanged.
    Keep,
}

impl VoteAction {
    /// Whether applying this action changes stored state.
    pub fn changes_state(self) -> bool {
        !matches!(self, VoteAction::Keep)
    }
}

/// Decides the action for a requested vote given the currently stored one.
pub fn transition(current: Option<Vote>, requested: Vote) -> VoteAction {
    match current {
        None => VoteAction::Insert,
        Some(stored) if stored == requested => VoteAction::Keep,
        Some(_) => VoteAction::Remove,
    }
}
