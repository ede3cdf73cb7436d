//! Binomial lattice option pricing.
//!
//! Data flows one way: inputs -> [`builder::Lattice`] -> terminal payoffs
//! ([`payoff`]) -> backward induction ([`induction`]) -> present value,
//! wired together by [`model::BinomialModel`].

pub mod builder;
pub mod config;
pub mod factors;
pub mod induction;
pub mod model;
pub mod node;
pub mod payoff;
pub mod probability;
