//! Tick-based horse race simulator with pari-mutuel payouts.
//!
//! `core` holds the race state machine, the race driver and the betting logic, `pre` the
//! configuration layer (option parsing, parameter files, boundary checks), `post` the result
//! reports and `interfaces` the messages sent to whoever follows a race live.

pub mod core;
pub mod interfaces;
pub mod post;
pub mod pre;
