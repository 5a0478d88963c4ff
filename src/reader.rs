use std::collections::VecDeque;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use encoding_rs::{CoderResult, Decoder, Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::SourceError;

/// Bytes pulled from the wrapped stream per read.
const RAW_CHUNK: usize = 4096;

/// A provider of decoded characters for the scanner window.
///
/// One capability, one method: fill the caller's slice and report how many
/// characters were written. Returning 0 does not by itself mean end of
/// stream; the window treats two consecutive zero-length fills as
/// exhaustion.
pub trait CharacterSource {
    fn fill(&mut self, out: &mut [char]) -> Result<usize, SourceError>;
}

/// Detected encoding information
#[derive(Debug, Clone)]
pub struct EncodingInfo {
    pub encoding: &'static Encoding,
    pub has_bom: bool,
    pub bom_length: usize,
    pub confidence: f32,
}

/// Detect BOM (Byte Order Mark)
pub fn detect_bom(bytes: &[u8]) -> Option<EncodingInfo> {
    if bytes.len() >= 3 {
        // UTF-8 BOM
        if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            return Some(EncodingInfo {
                encoding: UTF_8,
                has_bom: true,
                bom_length: 3,
                confidence: 1.0,
            });
        }
    }

    if bytes.len() >= 2 {
        // UTF-16 BOMs
        if bytes.starts_with(&[0xFE, 0xFF]) {
            return Some(EncodingInfo {
                encoding: UTF_16BE,
                has_bom: true,
                bom_length: 2,
                confidence: 1.0,
            });
        }
        if bytes.starts_with(&[0xFF, 0xFE]) {
            return Some(EncodingInfo {
                encoding: UTF_16LE,
                has_bom: true,
                bom_length: 2,
                confidence: 1.0,
            });
        }
    }

    None
}

/// Heuristic encoding detection for streams without a BOM
pub fn detect_encoding_heuristic(bytes: &[u8]) -> EncodingInfo {
    let sample_size = std::cmp::min(bytes.len(), 8192);
    let sample = &bytes[..sample_size];

    if std::str::from_utf8(sample).is_ok() {
        EncodingInfo {
            encoding: UTF_8,
            has_bom: false,
            bom_length: 0,
            confidence: 0.9,
        }
    } else {
        EncodingInfo {
            encoding: UTF_8,
            has_bom: false,
            bom_length: 0,
            confidence: 0.5,
        }
    }
}

/// In-memory character source over already-decoded text.
pub struct TextSource {
    chars: Vec<char>,
    position: usize,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            chars: text.into().chars().collect(),
            position: 0,
        }
    }
}

impl CharacterSource for TextSource {
    fn fill(&mut self, out: &mut [char]) -> Result<usize, SourceError> {
        let remaining = self.chars.len() - self.position;
        let count = std::cmp::min(out.len(), remaining);
        out[..count].copy_from_slice(&self.chars[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

/// Streaming character source over a byte stream with automatic encoding
/// detection.
///
/// The first read sniffs for a UTF-8 / UTF-16LE / UTF-16BE BOM. A detected
/// BOM pins the encoding and is elided from the emitted characters; without
/// one, a UTF-8 heuristic applies. Malformed byte sequences surface as
/// `SourceError::Decode` rather than replacement characters.
pub struct DecodingSource<R: Read> {
    input: R,
    decoder: Option<Decoder>,
    encoding_info: Option<EncodingInfo>,

    // Bytes buffered from the stream but not yet decoded
    raw: Vec<u8>,
    // Decoded characters not yet handed to the window
    pending: VecDeque<char>,

    input_done: bool,
    decode_done: bool,
    // Bytes handed to the decoder so far, for error reporting
    offset: usize,
}

impl<R: Read> DecodingSource<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            decoder: None,
            encoding_info: None,
            raw: Vec::with_capacity(RAW_CHUNK),
            pending: VecDeque::new(),
            input_done: false,
            decode_done: false,
            offset: 0,
        }
    }

    /// Get encoding information; available after the first `fill`.
    pub fn encoding_info(&self) -> Option<&EncodingInfo> {
        self.encoding_info.as_ref()
    }

    /// Whether the stream opened with a BOM; available after the first `fill`.
    pub fn has_bom(&self) -> bool {
        self.encoding_info
            .as_ref()
            .map(|info| info.has_bom)
            .unwrap_or(false)
    }

    fn encoding_name(&self) -> &'static str {
        self.encoding_info
            .as_ref()
            .map(|info| info.encoding.name())
            .unwrap_or("UTF-8")
    }

    fn read_more(&mut self) -> Result<(), SourceError> {
        let mut chunk = [0u8; RAW_CHUNK];
        let count = self.input.read(&mut chunk)?;
        if count == 0 {
            self.input_done = true;
        } else {
            self.raw.extend_from_slice(&chunk[..count]);
        }
        Ok(())
    }

    /// Decidir encoding y preparar el decoder incremental.
    fn sniff_encoding(&mut self) -> Result<(), SourceError> {
        // A UTF-8 BOM is three bytes; buffer at least that much first
        while self.raw.len() < 3 && !self.input_done {
            self.read_more()?;
        }

        let info = detect_bom(&self.raw).unwrap_or_else(|| detect_encoding_heuristic(&self.raw));
        log::debug!(
            "decoding input as {} (bom: {}, confidence: {:.2})",
            info.encoding.name(),
            info.has_bom,
            info.confidence
        );

        // The BOM is metadata, not playlist text
        self.raw.drain(..info.bom_length);
        self.offset += info.bom_length;
        self.decoder = Some(info.encoding.new_decoder_without_bom_handling());
        self.encoding_info = Some(info);
        Ok(())
    }

    fn pump(&mut self) -> Result<(), SourceError> {
        if self.decoder.is_none() {
            self.sniff_encoding()?;
        }
        if !self.input_done && self.raw.len() < RAW_CHUNK {
            self.read_more()?;
        }

        let last = self.input_done;
        let encoding = self.encoding_name();
        if let Some(decoder) = self.decoder.as_mut() {
            let mut decoded = String::with_capacity(
                decoder
                    .max_utf8_buffer_length(self.raw.len())
                    .unwrap_or(self.raw.len() + 16),
            );
            let (result, bytes_read, had_errors) =
                decoder.decode_to_string(&self.raw, &mut decoded, last);
            if had_errors {
                return Err(SourceError::Decode {
                    encoding,
                    offset: self.offset,
                });
            }
            self.offset += bytes_read;
            self.raw.drain(..bytes_read);
            self.pending.extend(decoded.chars());
            if last && self.raw.is_empty() && matches!(result, CoderResult::InputEmpty) {
                self.decode_done = true;
            }
        }
        Ok(())
    }
}

impl DecodingSource<Cursor<Vec<u8>>> {
    /// Source over an in-memory byte buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(Cursor::new(bytes))
    }
}

impl DecodingSource<File> {
    /// Source over a file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> CharacterSource for DecodingSource<R> {
    fn fill(&mut self, out: &mut [char]) -> Result<usize, SourceError> {
        let mut filled = 0;
        while filled < out.len() {
            if let Some(ch) = self.pending.pop_front() {
                out[filled] = ch;
                filled += 1;
            } else if self.decode_done {
                break;
            } else {
                self.pump()?;
            }
        }
        Ok(filled)
    }
}
