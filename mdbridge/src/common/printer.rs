//! Print targets used by the renderer.
//!
//! Text is *delayed*: it accumulates in the printer until syntax is written, at which point
//! the renderer escapes it and writes it out. The printer remembers whether the delayed run
//! began at the start of a line, which the escaper needs to know.

/// A single output buffer with a pending run of unescaped text.
#[derive(Debug, Default)]
pub struct Printer {
    buffer: String,
    delayed: String,
    delayed_at_line_start: bool,
    at_line_start: bool,
}

impl Printer {
    /// Printer for a whole document: output starts on a fresh line.
    pub fn new() -> Self {
        Printer {
            at_line_start: true,
            ..Default::default()
        }
    }

    /// Printer for a fragment that lands in the middle of a line (labels, cells, headings).
    pub fn fragment() -> Self {
        Printer::default()
    }

    /// Queue text to be escaped on the next flush.
    pub fn delay(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.delayed.is_empty() {
            self.delayed_at_line_start = self.at_line_start;
        }
        self.delayed.push_str(text);
        self.at_line_start = false;
    }

    /// Take the pending text and whether it started a line.
    pub fn take_delayed(&mut self) -> Option<(String, bool)> {
        if self.delayed.is_empty() {
            None
        } else {
            Some((std::mem::take(&mut self.delayed), self.delayed_at_line_start))
        }
    }

    /// Append text verbatim. Pending text must have been taken first.
    pub fn write(&mut self, text: &str) {
        debug_assert!(self.delayed.is_empty(), "write with pending delayed text");
        if text.is_empty() {
            return;
        }
        self.buffer.push_str(text);
        self.at_line_start = text.ends_with('\n');
    }

    /// Treat the current position as the start of line content, e.g. after a list marker.
    pub fn mark_line_start(&mut self) {
        if self.delayed.is_empty() {
            self.at_line_start = true;
        }
    }

    pub fn is_at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Nothing written and nothing pending.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.delayed.is_empty()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn into_buffer(self) -> String {
        self.buffer
    }
}

/// Stack of printers; the bottom one is the document printer and is never popped.
#[derive(Debug)]
pub struct PrinterStack {
    root: Printer,
    nested: Vec<Printer>,
}

impl PrinterStack {
    pub fn new() -> Self {
        PrinterStack {
            root: Printer::new(),
            nested: Vec::new(),
        }
    }

    pub fn push(&mut self, printer: Printer) {
        self.nested.push(printer);
    }

    /// Pop the top printer. Returns `None` when only the document printer is left.
    pub fn pop(&mut self) -> Option<Printer> {
        self.nested.pop()
    }

    pub fn top(&self) -> &Printer {
        self.nested.last().unwrap_or(&self.root)
    }

    pub fn top_mut(&mut self) -> &mut Printer {
        self.nested.last_mut().unwrap_or(&mut self.root)
    }

    pub fn depth(&self) -> usize {
        self.nested.len()
    }

    /// Consume the stack, folding any printers left open into the document.
    pub fn into_output(mut self) -> String {
        while let Some(printer) = self.nested.pop() {
            let text = printer.into_buffer();
            self.top_mut().write(&text);
        }
        self.root.into_buffer()
    }
}

impl Default for PrinterStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delayed_text_remembers_line_start() {
        let mut printer = Printer::new();
        printer.delay("- a");
        assert_eq!(printer.take_delayed(), Some(("- a".to_string(), true)));
        printer.write("x");
        printer.delay("- b");
        assert_eq!(printer.take_delayed(), Some(("- b".to_string(), false)));
    }

    #[test]
    fn newline_and_markers_restore_line_start() {
        let mut printer = Printer::new();
        printer.write("a\n");
        assert!(printer.is_at_line_start());
        printer.write("> ");
        assert!(!printer.is_at_line_start());
        printer.mark_line_start();
        assert!(printer.is_at_line_start());
    }

    #[test]
    fn fragments_start_mid_line() {
        let mut printer = Printer::fragment();
        printer.delay("# x");
        assert_eq!(printer.take_delayed(), Some(("# x".to_string(), false)));
    }

    #[test]
    fn stack_keeps_its_root() {
        let mut stack = PrinterStack::new();
        stack.top_mut().write("doc");
        stack.push(Printer::fragment());
        stack.top_mut().write(" label");
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top().buffer(), " label");
        assert_eq!(stack.into_output(), "doc label");
    }

    #[test]
    fn root_is_never_popped() {
        let mut stack = PrinterStack::new();
        assert!(stack.pop().is_none());
        assert!(stack.top().is_empty());
    }
}
