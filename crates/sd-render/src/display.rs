//! Deferred-display protocol.
//!
//! In [`DisplayMode::Live`] every drawing call copies offscreen → onscreen
//! and asks the presenter to repaint. In [`DisplayMode::Deferred`] drawing
//! only touches offscreen; the batch becomes visible at the next `show`.
//!
//! ```text
//!            show()                     show_for(d)
//!   ┌──────────────────────┐   ┌───────────────────────────┐
//!   ▼                      │   │                           ▼
//! Live ──── show_for(d) ───┼───┘                       Deferred
//!   ▲                      └──────────── show() ──────────┘
//! ```

use crate::backend::Presenter;
use crate::buffers::FrameBuffers;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Live,
    Deferred,
}

pub struct DisplayController {
    mode: DisplayMode,
    presenter: Box<dyn Presenter>,
}

impl std::fmt::Debug for DisplayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayController").field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl DisplayController {
    pub fn new(presenter: Box<dyn Presenter>) -> Self {
        Self {
            mode: DisplayMode::Live,
            presenter,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// The present trigger every drawing call ends with.
    /// Returns `true` when the buffers were presented.
    pub fn flush_if_live(&mut self, buffers: &mut FrameBuffers) -> bool {
        match self.mode {
            DisplayMode::Live => {
                self.present(buffers);
                true
            }
            DisplayMode::Deferred => false,
        }
    }

    /// Leave deferred mode and present the current offscreen buffer.
    pub fn show(&mut self, buffers: &mut FrameBuffers) {
        if self.mode != DisplayMode::Live {
            log::debug!("display mode: {:?} -> Live", self.mode);
        }
        self.mode = DisplayMode::Live;
        self.present(buffers);
    }

    /// Present, block the calling thread for `pause`, then enter deferred
    /// mode. This is the animation-frame primitive.
    pub fn show_for(&mut self, buffers: &mut FrameBuffers, pause: Duration) {
        self.present(buffers);
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
        if self.mode != DisplayMode::Deferred {
            log::debug!("display mode: {:?} -> Deferred", self.mode);
        }
        self.mode = DisplayMode::Deferred;
    }

    /// Enter deferred mode without presenting.
    pub fn enable_deferred(&mut self) {
        self.mode = DisplayMode::Deferred;
    }

    fn present(&mut self, buffers: &mut FrameBuffers) {
        buffers.copy_to_onscreen();
        self.presenter.present(buffers.onscreen());
    }
}
