mod frame_sink;
mod hub;
mod room;

pub use frame_sink::*;
pub use hub::*;
pub use room::*;
