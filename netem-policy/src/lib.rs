#![cfg_attr(not(test), warn(unused_crate_dependencies))]

//! Impairment policies for emulated network links.
//!
//! Each impairment axis is a single-method capability trait, queried once per
//! operation. Because the query happens on every operation, a running
//! simulation can be reconfigured at any point: swap the value inside a
//! `*Var` and the very next write sees it.
//!
//! Every axis ships in up to three forms:
//!
//! - a **constant** form implemented on plain values (`u64` is a
//!   [`Bandwidth`], `Duration` is a [`Latency`], `bool` is a [`Loss`] or
//!   [`Fault`]),
//! - an atomically mutable **`*Var`** form whose clones share one cell, with
//!   wait-free reads on the emission hot path,
//! - a **randomized** form where the axis is stochastic ([`RandomJitter`],
//!   [`RandomLoss`], [`RandomFault`]).
//!
//! One-off policies are written with the `*Fn` adapters, which lift any
//! closure into the matching trait.

mod bandwidth;
mod fault;
mod jitter;
mod latency;
mod loss;

pub use bandwidth::{Bandwidth, BandwidthFn, BandwidthVar};
pub use fault::{Fault, FaultFn, FaultVar, RandomFault};
pub use jitter::{Jitter, JitterFn, JitterVar, RandomJitter};
pub use latency::{Latency, LatencyFn, LatencyVar};
pub use loss::{Loss, LossFn, LossVar, RandomLoss};
