//! Pure bout data: roster, rounds, match state, snapshots.
//!
//! Everything here is plain owned values with no I/O; the services layer is
//! the only writer.

pub mod match_state;
pub mod roster;
pub mod round;
pub mod snapshot;

pub use roster::{Casting, CastingPolicy, ModelIdentity, Roster};
pub use round::{Phase, Round, TaskRecord, VoteRecord};
