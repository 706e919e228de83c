//! ProgressBar and other functionality to report the progress of a search

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use keccakf::progress::{PPFactory, StyledProgressBar};

/// Hands out progress bars drawn to stderr, or hidden ones in silent mode.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    hidden: bool,
}

#[derive(Debug, Clone)]
pub struct MyStyledProgressBar {
    pb: ProgressBar,
}

// ===============================================================================================

impl Progress {
    pub fn new(hidden: bool) -> Self {
        Self { hidden }
    }

    pub fn new_progress_bar(&self, len: u64) -> MyStyledProgressBar {
        let pb = ProgressBar::with_draw_target(len, self.draw_target());
        pb.set_style(Styles::Pb.style());

        MyStyledProgressBar::new(pb)
    }

    fn draw_target(&self) -> ProgressDrawTarget {
        if self.hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        }
    }
}

impl PPFactory for Progress {
    type ProgressBar = MyStyledProgressBar;

    fn new_progress_bar(&self, len: u64) -> Self::ProgressBar {
        self.new_progress_bar(len)
    }
}

// ===============================================================================================

impl MyStyledProgressBar {
    fn new(pb: ProgressBar) -> MyStyledProgressBar {
        Self { pb }
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    pub fn is_finished(&self) -> bool {
        self.pb.is_finished()
    }
}

impl StyledProgressBar for MyStyledProgressBar {
    /// Advances the position of a progress bar by delta.
    fn inc(&self, delta: u64) {
        self.pb.inc(delta);
    }

    /// Sets the current message of the progress bar.
    fn set_message(&self, msg: &str) {
        self.pb.set_message(msg);
    }

    /// Finishes the progress bar and sets a message.
    fn finish_with_message(&self, msg: &str) {
        self.pb.finish_with_message(msg);
    }

    /// Finishes the progress bar and completely clears it.
    fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }

    /// Will print a log line above the progress bar.
    /// Note that if the progress bar is hidden (silent mode, or stderr redirected into a file)
    /// println will not do anything either.
    fn println(&self, msg: &str) {
        self.pb.println(msg);
    }
}

// ===============================================================================================

enum Styles {
    Pb,
}

impl Styles {
    fn style(&self) -> ProgressStyle {
        match self {
            Styles::Pb => ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:60.cyan/yellow} {pos:>9}/{len:9} {msg}")
                .progress_chars("#>-"),
        }
    }
}
