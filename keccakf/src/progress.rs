//! Progress reporting for long-running searches.

/// Creates a fresh progress bar for each top-level search.
pub trait PPFactory {
    type ProgressBar: StyledProgressBar;

    fn new_progress_bar(&self, len: u64) -> Self::ProgressBar;
}

/// A trait allowing for flexibility for the user to choose what underlying ProgressBar they want to
/// use. In essence, this trait is almost like a newtype over any ProgressBar, with only the calls
/// to update and manipulate stat present. (I.e. all styling etc must be handled by the user when
/// implementing the Trait).
///
/// Progress is advisory: nothing a search returns depends on it.
pub trait StyledProgressBar: Clone + Send {
    fn inc(&self, delta: u64);
    fn set_message(&self, msg: &str);
    fn finish_with_message(&self, msg: &str);
    fn finish_and_clear(&self);
    fn println(&self, msg: &str);
}

/// Progress reporting which does nothing. The default for every search.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl PPFactory for NoProgress {
    type ProgressBar = NoProgress;

    fn new_progress_bar(&self, _len: u64) -> Self::ProgressBar {
        NoProgress
    }
}

impl StyledProgressBar for NoProgress {
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: &str) {}
    fn finish_with_message(&self, _msg: &str) {}
    fn finish_and_clear(&self) {}
    fn println(&self, _msg: &str) {}
}
