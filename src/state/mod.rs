//! State snapshots and the action history they are replayed from.
//!
//! The current state is always the fold of the reducer over the history,
//! seeded with the initial state. Undo pops the history and replays it
//! instead of restoring stored snapshots.

mod timeline;

pub use timeline::{replay, Timeline};
