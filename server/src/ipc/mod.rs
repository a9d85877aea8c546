pub mod client;
pub mod codec;
pub mod framing;
pub mod path;
pub mod protocol;
