/// Tracks whether an overlay is on screen. The overlay's purpose (editor
/// or delete confirmation) lives on the `App`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalCoordinator {
    visible: bool,
}

impl ModalCoordinator {
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
