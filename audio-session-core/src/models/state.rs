/// Capture session state machine.
///
/// State transitions:
/// ```text
/// closed → opened → capturing
///            ↑          │
///            └──────────┘   (capture may repeat while opened)
/// opened → closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Closed,
    Opened,
    Capturing,
}

impl CaptureState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, Self::Opened)
    }
}
