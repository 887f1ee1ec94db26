//! Sliding output window for LZ match copying.
//!
//! Decoded bytes accumulate in an output buffer; the window tracks how much
//! of the tail is addressable as match history (bounded by the dictionary
//! size) and serves back-references into it. LZMA2 keeps one window alive
//! across chunks, so the history survives per-chunk state resets until a
//! dictionary reset discards it.

use ironarc_core::error::{IronArcError, Result};

/// Output window with a dictionary-size-bounded match history.
#[derive(Debug)]
pub struct OutputWindow {
    output: Vec<u8>,
    dict_size: u64,
    /// Bytes produced since the last dictionary reset.
    total: u64,
}

impl OutputWindow {
    /// Create an empty window with the given dictionary size.
    pub fn new(dict_size: u32) -> Self {
        Self {
            output: Vec::new(),
            dict_size: u64::from(dict_size),
            total: 0,
        }
    }

    /// Total bytes produced since the last dictionary reset.
    pub fn total_produced(&self) -> u64 {
        self.total
    }

    /// Byte at the current rep0 distance, or 0 when the window holds no
    /// history yet. The zero default only matters for streams that open
    /// with a matched literal, which a well-formed encoder never emits.
    pub fn byte_at(&self, dist: u32) -> u8 {
        let dist = u64::from(dist);
        if dist < self.available() {
            self.output[self.output.len() - 1 - dist as usize]
        } else {
            0
        }
    }

    /// Append one decoded literal.
    pub fn append(&mut self, byte: u8) {
        self.output.push(byte);
        self.total += 1;
    }

    /// Copy `len` bytes starting `dist + 1` bytes back from the write
    /// position. Copies byte-by-byte so overlapping matches replicate the
    /// run as LZ77 requires.
    pub fn copy_match(&mut self, dist: u32, len: u32) -> Result<()> {
        if u64::from(dist) >= self.available() {
            return Err(IronArcError::invalid_distance(
                u64::from(dist),
                self.available(),
            ));
        }

        let mut src = self.output.len() - 1 - dist as usize;
        for _ in 0..len {
            let byte = self.output[src];
            self.output.push(byte);
            src += 1;
        }
        self.total += u64::from(len);
        Ok(())
    }

    /// Bytes currently addressable as match history.
    fn available(&self) -> u64 {
        self.total.min(self.dict_size)
    }

    /// Discard the match history and the produced-byte count, keeping the
    /// accumulated output.
    pub fn reset(&mut self) {
        self.total = 0;
    }

    /// Borrow the accumulated output.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take ownership of the accumulated output.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_byte_at() {
        let mut window = OutputWindow::new(4096);
        window.append(b'a');
        window.append(b'b');
        window.append(b'c');
        assert_eq!(window.byte_at(0), b'c');
        assert_eq!(window.byte_at(2), b'a');
        assert_eq!(window.total_produced(), 3);
    }

    #[test]
    fn test_byte_at_empty_window() {
        let window = OutputWindow::new(4096);
        assert_eq!(window.byte_at(0), 0);
    }

    #[test]
    fn test_overlapping_copy_replicates_run() {
        let mut window = OutputWindow::new(4096);
        window.append(b'A');
        window.copy_match(0, 5).unwrap();
        assert_eq!(window.output(), b"AAAAAA");
    }

    #[test]
    fn test_copy_match_distance_beyond_history() {
        let mut window = OutputWindow::new(4096);
        window.append(b'x');
        let err = window.copy_match(1, 3).unwrap_err();
        assert!(matches!(
            err,
            IronArcError::InvalidDistance {
                distance: 1,
                available: 1
            }
        ));
    }

    #[test]
    fn test_distance_bounded_by_dict_size() {
        let mut window = OutputWindow::new(4);
        for byte in b"abcdefgh" {
            window.append(*byte);
        }
        // Eight bytes produced, but only four are addressable.
        assert!(window.copy_match(3, 1).is_ok());
        assert!(window.copy_match(4, 1).is_err());
    }

    #[test]
    fn test_reset_clears_history_keeps_output() {
        let mut window = OutputWindow::new(4096);
        window.append(b'a');
        window.append(b'b');
        window.reset();
        assert_eq!(window.total_produced(), 0);
        assert_eq!(window.output(), b"ab");
        assert!(window.copy_match(0, 1).is_err());
    }
}
