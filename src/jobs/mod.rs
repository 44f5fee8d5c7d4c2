//! Periodic reconciliation jobs.
//!
//! Two independent control loops keep incident state matched to the
//! on-call schedule: one assigns unassigned open incidents to whoever is
//! on call, one reminds operators of open incidents that have not been
//! acknowledged. Both are idempotent and safe to run concurrently with
//! manual API calls because every underlying mutation is conditioned on
//! `acknowledged_at IS NULL`. A failed run is logged and retried on the
//! next scheduled tick, never in between.

pub mod assign;
pub mod remind;

pub use assign::{run_assign_once, spawn_assign_task};
pub use remind::{run_remind_once, spawn_remind_task};
