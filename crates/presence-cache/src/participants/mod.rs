//! Participant lookups against the signaling store.

mod user_lookup;

pub use user_lookup::RedisParticipantLookup;
