//! Core building blocks shared by the search engine and games.

pub mod rng;

pub use rng::SimRng;
