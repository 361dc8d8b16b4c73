/// Run-wide footnote numbering.
///
/// One sequence lives for the whole extraction run and is passed by `&mut`
/// to every resolution call, so numbers keep increasing across paragraphs
/// and nested citations share the same space as first-level ones.
#[derive(Debug, Default)]
pub struct CiteSequence {
    last: u32,
}

impl CiteSequence {
    /// Starts a sequence whose first number is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused number.
    pub fn next_num(&mut self) -> u32 {
        self.last += 1;
        self.last
    }

    /// The last number handed out, 0 when none has been.
    pub fn last(&self) -> u32 {
        self.last
    }
}
