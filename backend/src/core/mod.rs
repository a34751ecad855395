//! Cycle arithmetic shared by the simulator: half-cycle timing, discounting
//! and per-transition cost/utility accrual.

pub mod accrual;

pub use accrual::{event_time, present_value, transition_accrual, CycleAccrual};
