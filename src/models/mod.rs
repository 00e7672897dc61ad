// SPDX-License-Identifier: MIT

//! Entity models and their per-entity codecs.

pub mod challenge;
pub mod team;
pub mod tournament;
pub mod user;

pub use challenge::{Challenge, ChallengeMedia, MediaType};
pub use team::{CompletedChallenge, Completion, Team};
pub use tournament::Tournament;
pub use user::User;
