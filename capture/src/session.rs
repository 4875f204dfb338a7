//! Per-attempt capture state and its guaranteed cleanup.

use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::error::CaptureStep;
use crate::platform::{CaptureImage, CaptureTarget};

/// Transient state of one export attempt.
///
/// Dropping the session restores every swapped image source, shows the
/// overlay again and clears the owner's in-progress flag. That also covers
/// the future being dropped halfway through.
pub struct CaptureSession<'a, T: CaptureTarget> {
    target: &'a T,
    in_progress: &'a Cell<bool>,
    originals: RefCell<Vec<(T::Image, String)>>,
    overlay_hidden: Cell<bool>,
    log: RefCell<Vec<String>>,
    cleaned_up: Cell<bool>,
}

impl<'a, T: CaptureTarget> CaptureSession<'a, T> {
    /// Caller must have set `in_progress` already
    pub fn new(target: &'a T, in_progress: &'a Cell<bool>) -> Self {
        Self {
            target,
            in_progress,
            originals: RefCell::new(Vec::new()),
            overlay_hidden: Cell::new(false),
            log: RefCell::new(Vec::new()),
            cleaned_up: Cell::new(false),
        }
    }

    pub fn log(&self, step: CaptureStep, message: impl Into<String>) {
        let line = format!("[{}] {}", step, message.into());
        debug!("{}", line);
        self.log.borrow_mut().push(line);
    }

    /// Swap `img` to `new_src`, remembering `original` for cleanup
    pub fn swap_source(&self, img: &T::Image, original: String, new_src: &str) {
        img.set_src(new_src);
        self.originals.borrow_mut().push((img.clone(), original));
    }

    pub fn swapped_count(&self) -> usize {
        self.originals.borrow().len()
    }

    pub fn hide_overlay(&self) {
        self.target.set_overlay_hidden(true);
        self.overlay_hidden.set(true);
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// Restore the live DOM. Safe to call more than once.
    pub fn cleanup(&self) {
        if self.cleaned_up.replace(true) {
            return;
        }
        let originals = std::mem::take(&mut *self.originals.borrow_mut());
        let restored = originals.len();
        for (img, src) in originals {
            img.set_src(&src);
        }
        if self.overlay_hidden.replace(false) {
            self.target.set_overlay_hidden(false);
        }
        self.in_progress.set(false);
        self.log(CaptureStep::Cleanup, format!("restored {} image source(s)", restored));
    }

    /// Run cleanup and hand back the step log
    pub fn finish(self) -> Vec<String> {
        self.cleanup();
        self.log_lines()
    }
}

impl<T: CaptureTarget> Drop for CaptureSession<'_, T> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
