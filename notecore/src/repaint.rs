//! Repaint controller
//!
//! egui only repaints when input arrives. Two things in the editor change
//! outside of input: the tag vector is reconciled one frame after the text
//! widget edits the buffer, and the autosave thread updates the status bar.
//!
//! Apps call `mark_needs_repaint()` for the first case and
//! `schedule_after()` for the second; `end_frame()` turns both into at most
//! one request to egui.

use std::time::Duration;

/// Why this frame is being painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaintReason {
    /// First frame, always painted.
    Init,
    /// User input (mouse move, key press, scroll).
    Input,
    /// App-requested repaint (state changed internally).
    StateChange,
    /// A scheduled wake-up fired.
    Scheduled,
}

/// Controls when the egui context should request repaints.
///
/// Call [`RepaintController::begin_frame`] at the top of `update()` and
/// [`RepaintController::end_frame`] at the bottom.
#[derive(Debug)]
pub struct RepaintController {
    needs_repaint: bool,
    /// Earliest pending timed wake-up requested during this frame.
    wake_after: Option<Duration>,
    frame: u64,
    reason: RepaintReason,
}

impl Default for RepaintController {
    fn default() -> Self {
        Self::new()
    }
}

impl RepaintController {
    pub fn new() -> Self {
        Self {
            needs_repaint: false,
            wake_after: None,
            frame: 0,
            reason: RepaintReason::Init,
        }
    }

    /// Request a single repaint on the next opportunity.
    pub fn mark_needs_repaint(&mut self) {
        self.needs_repaint = true;
    }

    /// Request a repaint after `delay`. Multiple requests in one frame keep
    /// the shortest delay.
    pub fn schedule_after(&mut self, delay: Duration) {
        self.wake_after = Some(match self.wake_after {
            Some(existing) => existing.min(delay),
            None => delay,
        });
    }

    pub fn reason(&self) -> RepaintReason {
        self.reason
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Classify the frame; call at the **start** of `update()`.
    pub fn begin_frame(&mut self, ctx: &egui::Context) {
        let had_input = ctx.input(|i| {
            !i.events.is_empty()
                || i.pointer.any_pressed()
                || i.pointer.any_released()
                || i.raw_scroll_delta != egui::Vec2::ZERO
                || i.pointer.is_moving()
        });
        self.reason = self.classify(had_input);
        self.needs_repaint = false;
        self.wake_after = None;
    }

    fn classify(&self, had_input: bool) -> RepaintReason {
        if self.frame == 0 {
            RepaintReason::Init
        } else if had_input {
            RepaintReason::Input
        } else if self.needs_repaint {
            RepaintReason::StateChange
        } else {
            RepaintReason::Scheduled
        }
    }

    /// Schedule the next repaint; call at the **end** of `update()`.
    pub fn end_frame(&mut self, ctx: &egui::Context) {
        self.frame += 1;

        if self.needs_repaint {
            ctx.request_repaint();
        } else if let Some(delay) = self.wake_after {
            ctx.request_repaint_after(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_init() {
        let rc = RepaintController::new();
        assert_eq!(rc.classify(true), RepaintReason::Init);
    }

    #[test]
    fn test_classify_after_first_frame() {
        let mut rc = RepaintController::new();
        rc.frame = 3;
        assert_eq!(rc.classify(true), RepaintReason::Input);
        assert_eq!(rc.classify(false), RepaintReason::Scheduled);
        rc.mark_needs_repaint();
        assert_eq!(rc.classify(false), RepaintReason::StateChange);
    }

    #[test]
    fn test_schedule_keeps_shortest_delay() {
        let mut rc = RepaintController::new();
        rc.schedule_after(Duration::from_secs(10));
        rc.schedule_after(Duration::from_secs(2));
        rc.schedule_after(Duration::from_secs(5));
        assert_eq!(rc.wake_after, Some(Duration::from_secs(2)));
    }
}
