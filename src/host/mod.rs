//! Interface to the host application
//!
//! The host is two collaborators: a [`StateProvider`] that reads the
//! application's state and an [`InputDriver`] that injects input. Concrete
//! memory readers live outside this crate; the Windows input backend lives in
//! `platform`.

pub mod snapshot;

pub use snapshot::{Snapshot, UiElement, UiPath};

use crate::domain::core::Point;
use crate::input::{InputDriver, MouseButton, VirtualKey};

/// Supplies a fresh snapshot of the host application
pub trait StateProvider {
    /// Reads the current state; called at most once per tick
    fn snapshot(&mut self) -> Snapshot;
}

/// Joins a separate provider and driver into one host
#[derive(Debug)]
pub struct HostPair<P, D> {
    pub provider: P,
    pub driver: D,
}

impl<P, D> HostPair<P, D> {
    pub fn new(provider: P, driver: D) -> Self {
        Self { provider, driver }
    }
}

impl<P: StateProvider, D> StateProvider for HostPair<P, D> {
    fn snapshot(&mut self) -> Snapshot {
        self.provider.snapshot()
    }
}

impl<P, D: InputDriver> InputDriver for HostPair<P, D> {
    fn set_pointer(&mut self, pos: Point) {
        self.driver.set_pointer(pos);
    }

    fn key_down(&mut self, key: VirtualKey) {
        self.driver.key_down(key);
    }

    fn key_up(&mut self, key: VirtualKey) {
        self.driver.key_up(key);
    }

    fn button_down(&mut self, button: MouseButton) {
        self.driver.button_down(button);
    }

    fn button_up(&mut self, button: MouseButton) {
        self.driver.button_up(button);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::core::Rect;
    use crate::input::InputEvent;
    use crate::testing::RecordingDriver;

    struct Fixed(Snapshot);

    impl StateProvider for Fixed {
        fn snapshot(&mut self) -> Snapshot {
            self.0.clone()
        }
    }

    #[test]
    fn pair_forwards_reads_and_input() {
        let snapshot = Snapshot::new()
            .with_element(UiPath::InventoryPanel, UiElement::visible(Rect::new(0, 0, 10, 10)));
        let mut host = HostPair::new(Fixed(snapshot), RecordingDriver::default());

        assert!(host.snapshot().is_visible(UiPath::InventoryPanel));

        host.set_pointer(Point::new(4, 5));
        host.button_down(MouseButton::Left);
        host.key_up(VirtualKey::I);
        assert_eq!(
            host.driver.events(),
            &[
                InputEvent::PointerMoved(Point::new(4, 5)),
                InputEvent::ButtonDown(MouseButton::Left),
                InputEvent::KeyUp(VirtualKey::I),
            ]
        );
    }
}
