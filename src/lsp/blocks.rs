//! Directive block location

/// Line span of one directive block.
///
/// `start` is the directive line itself. `end` is the line just before the
/// line that terminated the block, or the buffer length when the block runs
/// to the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: usize,
    pub end: usize,
}

impl BlockRange {
    /// Indices of the body lines, clamped to a buffer of `len` lines.
    ///
    /// The body lies strictly between `start` and `end`.
    pub fn body(&self, len: usize) -> std::ops::Range<usize> {
        let from = (self.start + 1).min(len);
        let to = self.end.min(len).max(from);
        from..to
    }
}

/// Find every block that opens on a line starting with `start_marker` and
/// closes before the next line starting with `end_marker`.
///
/// The closing line is examined again as a possible opener, since a
/// directive both ends the previous block and may begin a new one. A block
/// still open at the end of input closes at `lines.len()`.
pub fn find_blocks(start_marker: &str, end_marker: &str, lines: &[&str]) -> Vec<BlockRange> {
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;
    let mut i = 0;

    while i < lines.len() {
        match open {
            None => {
                if lines[i].starts_with(start_marker) {
                    open = Some(i);
                }
                i += 1;
            }
            Some(start) => {
                if lines[i].starts_with(end_marker) {
                    blocks.push(BlockRange { start, end: i - 1 });
                    open = None;
                    // re-examine this line as a start
                } else {
                    i += 1;
                }
            }
        }
    }

    if let Some(start) = open {
        blocks.push(BlockRange {
            start,
            end: lines.len(),
        });
    }

    blocks
}
