//! Per-character feedback prefetch buffers.
//!
//! Holds ready-to-play (text, audio) encouragement pairs, one queue per
//! outcome, refilled ahead of need so a child's answer gets an immediate
//! audible response despite multi-second generation latency.

use crate::constants::FEEDBACK_BUFFER_TARGET;
use std::collections::VecDeque;

/// One ready-to-use spoken encouragement. Consumed exactly once by a
/// buffer pop; never replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackItem {
    pub text: String,
    /// Base64-encoded PCM payload; empty when synthesis failed
    pub audio: String,
}

/// Double queue of feedback items for one character: one lane per outcome.
/// Background refill drives each lane toward [FEEDBACK_BUFFER_TARGET];
/// lanes may transiently be empty, which triggers the synchronous fallback
/// in the content client.
#[derive(Debug, Default)]
pub struct FeedbackBuffer {
    success: VecDeque<FeedbackItem>,
    failure: VecDeque<FeedbackItem>,
}

impl FeedbackBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane(&mut self, is_correct: bool) -> &mut VecDeque<FeedbackItem> {
        if is_correct {
            &mut self.success
        } else {
            &mut self.failure
        }
    }

    /// Pop the oldest item from the matching lane (FIFO, at-most-once)
    pub fn pop(&mut self, is_correct: bool) -> Option<FeedbackItem> {
        self.lane(is_correct).pop_front()
    }

    pub fn push(&mut self, is_correct: bool, item: FeedbackItem) {
        self.lane(is_correct).push_back(item);
    }

    pub fn len(&self, is_correct: bool) -> usize {
        if is_correct {
            self.success.len()
        } else {
            self.failure.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.failure.is_empty()
    }

    /// Whether the lane is below its refill target
    pub fn needs(&self, is_correct: bool) -> bool {
        self.len(is_correct) < FEEDBACK_BUFFER_TARGET
    }
}
