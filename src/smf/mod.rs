pub mod codec;
pub mod events;
pub mod header;
pub mod json;
pub mod reader;
pub mod writer;

pub use events::{ChordMember, MemberPitch, Note, Pitch};
pub use header::TrackMode;
pub use json::SmfJson;
pub use reader::{SmfEvent, SmfHeader, SmfReader, TrackEvent};
pub use writer::SmfWriter;
