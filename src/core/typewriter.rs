/// Typewriter reveal — interval-driven character display.
///
/// Reveals text one Unicode character per interval, so multi-byte glyphs
/// in the content survive. Hosts feed elapsed milliseconds and render
/// `visible()`.

pub const DEFAULT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte offset of each char boundary, so `visible` is a cheap slice.
    boundaries: Vec<usize>,
    shown: usize,
    interval_ms: u64,
    carry_ms: u64,
    completed_seen: bool,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, interval_ms: u64) -> Self {
        let text = text.into();
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self {
            text,
            boundaries,
            shown: 0,
            interval_ms: interval_ms.max(1),
            carry_ms: 0,
            completed_seen: false,
        }
    }

    pub fn with_default_speed(text: impl Into<String>) -> Self {
        Self::new(text, DEFAULT_INTERVAL_MS)
    }

    pub fn total_chars(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn shown_chars(&self) -> usize {
        self.shown
    }

    /// Feeds elapsed time; leftover milliseconds carry into the next
    /// call. Returns how many new characters were revealed.
    pub fn advance(&mut self, ms: u64) -> usize {
        if self.is_done() {
            return 0;
        }
        self.carry_ms += ms;
        let steps = (self.carry_ms / self.interval_ms) as usize;
        self.carry_ms %= self.interval_ms;
        let before = self.shown;
        self.shown = (self.shown + steps).min(self.total_chars());
        self.shown - before
    }

    /// The revealed prefix.
    pub fn visible(&self) -> &str {
        &self.text[..self.boundaries[self.shown]]
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn is_done(&self) -> bool {
        self.shown == self.total_chars()
    }

    /// Reveals everything at once (the user skipped the effect).
    pub fn skip_to_end(&mut self) {
        self.shown = self.total_chars();
        self.carry_ms = 0;
    }

    /// True exactly once, the first time it is called after the reveal
    /// finished. Mirrors a one-shot completion callback.
    pub fn just_completed(&mut self) -> bool {
        if self.is_done() && !self.completed_seen {
            self.completed_seen = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_char_per_interval() {
        let mut tw = Typewriter::new("abcd", 50);
        assert_eq!(tw.visible(), "");
        assert_eq!(tw.advance(50), 1);
        assert_eq!(tw.visible(), "a");
        assert_eq!(tw.advance(100), 2);
        assert_eq!(tw.visible(), "abc");
    }

    #[test]
    fn carry_accumulates_partial_intervals() {
        let mut tw = Typewriter::new("ab", 50);
        assert_eq!(tw.advance(30), 0);
        assert_eq!(tw.advance(30), 1);
        assert_eq!(tw.visible(), "a");
    }

    #[test]
    fn clamps_at_end_of_text() {
        let mut tw = Typewriter::new("hi", 10);
        assert_eq!(tw.advance(10_000), 2);
        assert!(tw.is_done());
        assert_eq!(tw.advance(100), 0);
        assert_eq!(tw.visible(), "hi");
    }

    #[test]
    fn multibyte_chars_stay_intact() {
        let mut tw = Typewriter::new("a🎉b", 10);
        tw.advance(10);
        assert_eq!(tw.visible(), "a");
        tw.advance(10);
        assert_eq!(tw.visible(), "a🎉");
        tw.advance(10);
        assert_eq!(tw.visible(), "a🎉b");
    }

    #[test]
    fn skip_to_end_reveals_everything() {
        let mut tw = Typewriter::new("a long sentence", 50);
        tw.advance(50);
        tw.skip_to_end();
        assert!(tw.is_done());
        assert_eq!(tw.visible(), "a long sentence");
    }

    #[test]
    fn just_completed_fires_once() {
        let mut tw = Typewriter::new("ab", 10);
        assert!(!tw.just_completed());
        tw.advance(20);
        assert!(tw.just_completed());
        assert!(!tw.just_completed());
    }

    #[test]
    fn empty_text_is_done_immediately() {
        let mut tw = Typewriter::new("", 50);
        assert!(tw.is_done());
        assert_eq!(tw.visible(), "");
        assert!(tw.just_completed());
    }
}
