pub mod bridge_loop;
pub mod errors;
pub mod frame;
pub mod manifest;
pub mod message_codec;
pub mod translator;

pub use bridge_loop::{BridgeLoop, LoopState, LoopStats};
pub use errors::FrameError;
