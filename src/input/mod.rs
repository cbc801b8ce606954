pub mod driver;
pub mod hotkeys;

pub use driver::{InputDriver, InputEvent, KeyHold, MouseButton};
pub use hotkeys::{EdgeDetector, HotkeyBindings, Signals, VirtualKey};
