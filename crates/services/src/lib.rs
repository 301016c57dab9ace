//! # services
//!
//! The core behavior of the relay bot, kept free of any platform or storage
//! detail: the vote state machine, the promotion rule, keyboard rendering,
//! and the orchestrators that tie them to the ports.

pub mod keyboard;
pub mod promotion;
pub mod submission;
pub mod sync;
pub mod vote;

pub use promotion::PromotionPolicy;
pub use submission::{SubmissionOutcome, SubmissionService};
pub use sync::{ChannelIds, SyncService};
