/*!
 * ===============================================================================
 * HLS-Scanner: Streaming Tokenizer for HLS Playlists
 * ===============================================================================
 *
 * This crate implements the lexical layer for HTTP Live Streaming playlist
 * text, the `#EXTM3U` family of line-oriented documents:
 *
 * 1. 🔍  TOKENS: Character stream → flat ordered lexical tokens
 * 2. 📍  MARKS: 1-based line/column on every token, stable across refills
 * 3. 🔄  STREAMING: Input of arbitrary length through a bounded window
 * 4. 📖  SOURCES: Text, byte-stream, and file adapters with BOM handling
 *
 * PIPELINE ARCHITECTURE:
 * ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
 * │   Reader    │ -> │   Window    │ -> │   Scanner   │ -> │   Tokens    │
 * │ (chars)     │    │ (lookahead) │    │ (states)    │    │ (marked)    │
 * └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
 *
 * The scanner never aborts on malformed playlist syntax; ill-formed input
 * is encoded in the token stream (see `TokenType::UnexpectedData`). The
 * only error surface is the character source itself.
 *
 * ```
 * use hls_scanner::{scan_text, ScannerOptions, TokenType};
 *
 * let tokens = scan_text("#EXTM3U\n", ScannerOptions::new()).unwrap();
 * assert_eq!(tokens[0].token_type, TokenType::TagName);
 * assert_eq!(tokens[0].value, "EXTM3U");
 * ```
 */

pub mod error;   // ❌ Error surface: source failures with marks
pub mod reader;  // 📖 Character sources: text, bytes, files, BOM detection
pub mod scanner; // 🔍 Lexical analysis: characters → tokens

mod window; // 🪟 Sliding lookahead buffer + position bookkeeping

pub use error::{ScanError, ScanResult, SourceError};
pub use reader::{
    detect_bom, detect_encoding_heuristic, CharacterSource, DecodingSource, EncodingInfo,
    TextSource,
};
pub use scanner::{scan_text, Mark, Scanner, ScannerOptions, Token, TokenType};
