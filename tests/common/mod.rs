#![allow(dead_code)]

use hls_scanner::{CharacterSource, SourceError};

/// Source that hands out at most `chunk` characters per fill call.
pub struct ChunkedSource {
    chars: Vec<char>,
    position: usize,
    chunk: usize,
}

impl ChunkedSource {
    pub fn new(text: &str, chunk: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            position: 0,
            chunk,
        }
    }
}

impl CharacterSource for ChunkedSource {
    fn fill(&mut self, out: &mut [char]) -> Result<usize, SourceError> {
        let remaining = self.chars.len() - self.position;
        let count = self.chunk.min(out.len()).min(remaining);
        out[..count].copy_from_slice(&self.chars[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

/// Source that alternates zero-length reads with single characters. A lone
/// zero-length read must not be mistaken for end of stream.
pub struct StutteringSource {
    chars: Vec<char>,
    position: usize,
    stutter: bool,
}

impl StutteringSource {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            position: 0,
            stutter: true,
        }
    }
}

impl CharacterSource for StutteringSource {
    fn fill(&mut self, out: &mut [char]) -> Result<usize, SourceError> {
        self.stutter = !self.stutter;
        if self.stutter || self.position == self.chars.len() || out.is_empty() {
            return Ok(0);
        }
        out[0] = self.chars[self.position];
        self.position += 1;
        Ok(1)
    }
}

/// Source that fails with an I/O error after a prefix of characters.
pub struct FailingSource {
    chars: Vec<char>,
    position: usize,
}

impl FailingSource {
    pub fn new(prefix: &str) -> Self {
        Self {
            chars: prefix.chars().collect(),
            position: 0,
        }
    }
}

impl CharacterSource for FailingSource {
    fn fill(&mut self, out: &mut [char]) -> Result<usize, SourceError> {
        if self.position == self.chars.len() {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "stream dropped",
            )));
        }
        let remaining = self.chars.len() - self.position;
        let count = out.len().min(remaining);
        out[..count].copy_from_slice(&self.chars[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}
