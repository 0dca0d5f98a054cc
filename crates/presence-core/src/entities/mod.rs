//! Domain entities

mod pbx;
mod presence;
mod subscriber;

pub use pbx::{PbxInfo, ReplicateStart, CAPABILITY_PBX_API, CAPABILITY_PBX_TABLE_USERS};
pub use presence::{Activity, PresenceCommand, PRESENCE_URI_SCHEME};
pub use subscriber::{EmailEntry, SubscriberRecord};
