//! Listener stack used while visiting a document.
//!
//! Events are always sent to the top of the stack. Each [`Frame`] filters or rewrites what it
//! receives and forwards the result to the frame below it; the bottom of the stack is the
//! caller's [`Listener`].
//!
//! Frames are only pushed through [`ListenerStack::push`], which hands back a [`ScopedFrame`].
//! Dropping the guard pops the frame, so an early `?` return cannot leave a filter behind.

use crate::ir::events::{Event, Listener};
use std::ops::{Deref, DerefMut};

/// A filtering layer on the listener stack.
#[derive(Debug)]
pub enum Frame {
    /// Drops paragraph boundaries. Paragraphs after the first are separated by a `NewLine` so
    /// their words stay apart.
    SwallowParagraphs { seen: bool },
    /// Buffers every event instead of forwarding it.
    Capture(Vec<Event>),
    /// Turns paragraphs into quotation lines.
    QuoteLines(QuoteLines),
}

impl Frame {
    pub fn swallow_paragraphs() -> Self {
        Frame::SwallowParagraphs { seen: false }
    }

    pub fn capture() -> Self {
        Frame::Capture(Vec::new())
    }

    pub fn quote_lines() -> Self {
        Frame::QuoteLines(QuoteLines::default())
    }

    fn filter(&mut self, event: Event, next: &mut dyn FnMut(Event)) {
        match self {
            Frame::SwallowParagraphs { seen } => match event {
                Event::BeginParagraph => {
                    if *seen {
                        next(Event::NewLine);
                    }
                }
                Event::EndParagraph => *seen = true,
                other => next(other),
            },
            Frame::Capture(events) => events.push(event),
            Frame::QuoteLines(quote) => quote.filter(event, next),
        }
    }
}

/// State of a quotation being rewritten into lines.
#[derive(Debug, Default)]
pub struct QuoteLines {
    line_open: bool,
    /// Depth of nested quotations passing through; their events are forwarded untouched.
    nested: usize,
}

impl QuoteLines {
    fn filter(&mut self, event: Event, next: &mut dyn FnMut(Event)) {
        if self.nested > 0 {
            match event {
                Event::BeginQuotation => self.nested += 1,
                Event::EndQuotation => self.nested -= 1,
                _ => {}
            }
            next(event);
            return;
        }

        match event {
            Event::BeginParagraph => {
                if self.line_open {
                    next(Event::EndQuotationLine);
                }
                next(Event::BeginQuotationLine);
                self.line_open = true;
            }
            Event::EndParagraph => {}
            Event::BeginQuotation => {
                self.open_line(next);
                self.nested += 1;
                next(event);
            }
            other => {
                self.open_line(next);
                next(other);
            }
        }
    }

    fn open_line(&mut self, next: &mut dyn FnMut(Event)) {
        if !self.line_open {
            next(Event::BeginQuotationLine);
            self.line_open = true;
        }
    }

    /// Close the line left open by the last paragraph.
    fn close(&mut self, next: &mut dyn FnMut(Event)) {
        if self.line_open {
            next(Event::EndQuotationLine);
            self.line_open = false;
        }
    }
}

/// Ordered stack of frames over a base listener.
pub struct ListenerStack<'l> {
    base: &'l mut dyn Listener,
    frames: Vec<Frame>,
}

impl<'l> ListenerStack<'l> {
    pub fn new(base: &'l mut dyn Listener) -> Self {
        ListenerStack {
            base,
            frames: Vec::new(),
        }
    }

    /// Send an event to the top of the stack.
    pub fn emit(&mut self, event: Event) {
        dispatch(&mut self.frames, &mut *self.base, event);
    }

    /// Push a frame; it stays active until the returned guard is dropped or finished.
    pub fn push(&mut self, frame: Frame) -> ScopedFrame<'_, 'l> {
        self.frames.push(frame);
        let depth = self.frames.len();
        ScopedFrame { stack: self, depth }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

fn dispatch(frames: &mut [Frame], base: &mut dyn Listener, event: Event) {
    match frames.split_last_mut() {
        None => base.on_event(&event),
        Some((top, rest)) => top.filter(event, &mut |forwarded| {
            dispatch(&mut *rest, &mut *base, forwarded)
        }),
    }
}

/// Guard for a pushed frame. Dereferences to the stack so nested visits go through it.
pub struct ScopedFrame<'s, 'l> {
    stack: &'s mut ListenerStack<'l>,
    depth: usize,
}

impl ScopedFrame<'_, '_> {
    /// Pop the frame now and hand it back, flushing what it still holds.
    ///
    /// A capture frame returns its buffered events; a quote frame closes its open line first.
    pub fn finish(mut self) -> Vec<Event> {
        let Some(frame) = self.pop() else {
            return Vec::new();
        };
        match frame {
            Frame::Capture(events) => events,
            Frame::QuoteLines(mut quote) => {
                quote.close(&mut |event| self.stack.emit(event));
                Vec::new()
            }
            Frame::SwallowParagraphs { .. } => Vec::new(),
        }
    }

    fn pop(&mut self) -> Option<Frame> {
        if self.stack.frames.len() == self.depth {
            self.stack.frames.pop()
        } else {
            None
        }
    }
}

impl<'l> Deref for ScopedFrame<'_, 'l> {
    type Target = ListenerStack<'l>;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for ScopedFrame<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for ScopedFrame<'_, '_> {
    fn drop(&mut self) {
        // Nested guards borrow this one, so they are gone by now.
        self.stack.frames.truncate(self.depth - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(word: &str) -> Vec<Event> {
        vec![Event::BeginParagraph, Event::word(word), Event::EndParagraph]
    }

    #[test]
    fn events_reach_base_without_frames() {
        let mut sink: Vec<Event> = Vec::new();
        let mut stack = ListenerStack::new(&mut sink);
        stack.emit(Event::Space);
        drop(stack);
        assert_eq!(sink, vec![Event::Space]);
    }

    #[test]
    fn swallow_drops_paragraphs_and_separates_them() {
        let mut sink: Vec<Event> = Vec::new();
        let mut stack = ListenerStack::new(&mut sink);
        {
            let mut scope = stack.push(Frame::swallow_paragraphs());
            for event in paragraph("a").into_iter().chain(paragraph("b")) {
                scope.emit(event);
            }
        }
        assert_eq!(stack.depth(), 0);
        drop(stack);
        assert_eq!(
            sink,
            vec![Event::word("a"), Event::NewLine, Event::word("b")]
        );
    }

    #[test]
    fn capture_returns_buffer_on_finish() {
        let mut sink: Vec<Event> = Vec::new();
        let mut stack = ListenerStack::new(&mut sink);
        let mut scope = stack.push(Frame::capture());
        scope.emit(Event::word("held"));
        let held = scope.finish();
        stack.emit(Event::Space);
        drop(stack);

        assert_eq!(held, vec![Event::word("held")]);
        assert_eq!(sink, vec![Event::Space]);
    }

    #[test]
    fn guard_pops_on_early_return() {
        fn fails(stack: &mut ListenerStack<'_>) -> Result<(), ()> {
            let mut scope = stack.push(Frame::capture());
            scope.emit(Event::Space);
            Err(())
        }

        let mut sink: Vec<Event> = Vec::new();
        let mut stack = ListenerStack::new(&mut sink);
        assert!(fails(&mut stack).is_err());
        assert_eq!(stack.depth(), 0);
        stack.emit(Event::NewLine);
        drop(stack);
        assert_eq!(sink, vec![Event::NewLine]);
    }

    #[test]
    fn quote_lines_rewrite_paragraphs() {
        let mut sink: Vec<Event> = Vec::new();
        let mut stack = ListenerStack::new(&mut sink);
        let mut scope = stack.push(Frame::quote_lines());
        for event in paragraph("a").into_iter().chain(paragraph("b")) {
            scope.emit(event);
        }
        scope.finish();
        drop(stack);

        assert_eq!(
            sink,
            vec![
                Event::BeginQuotationLine,
                Event::word("a"),
                Event::EndQuotationLine,
                Event::BeginQuotationLine,
                Event::word("b"),
                Event::EndQuotationLine,
            ]
        );
    }

    #[test]
    fn nested_quotation_passes_through_outer_frame() {
        let mut sink: Vec<Event> = Vec::new();
        let mut stack = ListenerStack::new(&mut sink);
        let mut outer = stack.push(Frame::quote_lines());
        outer.emit(Event::BeginQuotation);
        {
            let mut inner = outer.push(Frame::quote_lines());
            for event in paragraph("deep") {
                inner.emit(event);
            }
            inner.finish();
        }
        outer.emit(Event::EndQuotation);
        outer.finish();
        drop(stack);

        assert_eq!(
            sink,
            vec![
                Event::BeginQuotationLine,
                Event::BeginQuotation,
                Event::BeginQuotationLine,
                Event::word("deep"),
                Event::EndQuotationLine,
                Event::EndQuotation,
                Event::EndQuotationLine,
            ]
        );
    }
}
