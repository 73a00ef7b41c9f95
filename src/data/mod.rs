//! Rating data consumed by the factorization core.
//!
//! Loading and storage of ratings live outside this crate; callers hand in
//! [`Rating`] triples and get back an indexed [`RatingSnapshot`].

mod domain;
mod snapshot;

pub use domain::PreferenceDomain;
pub use snapshot::{IndexedRating, Rating, RatingSnapshot};
