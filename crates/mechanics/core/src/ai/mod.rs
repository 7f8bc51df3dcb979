//! Combat decision-making for AI-controlled actors.
//!
//! # Layers
//!
//! - [`rating`]: numeric worth of effects, spells, items and weapons
//! - [`flee`]: desire to run and the decision against the best option
//! - [`planner`]: picks the best [`Action`] and readies it on the actor
//!
//! Rating and planning only read; [`Action::prepare`] is the single place
//! a decision touches the actor or its inventory.

pub mod action;
pub mod flee;
pub mod planner;
pub mod rating;

pub use action::{Action, ItemRef};
pub use flee::{FLEE_THRESHOLD, make_flee_decision, rate_flee};
pub use planner::{PlannedAction, plan_next_action, prepare_next_action};
