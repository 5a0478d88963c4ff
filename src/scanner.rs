/*!
 * ===============================================================================
 * HLS-Scanner: Streaming Lexical Scanner
 * ===============================================================================
 *
 * This file implements the HLS playlist LEXICAL SCANNER:
 *
 * 1. 🔍  ANALYSIS: Playlist text → flat ordered lexical tokens
 * 2. 📍  POSITIONS: 1-based line/column mark on every token
 * 3. 🔄  STREAMING: Bounded lookahead window, input of arbitrary length
 * 4. 🎛️  STATES: Thirteen-state machine for context-sensitive syntax
 *
 * SCANNER ARCHITECTURE:
 * ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
 * │ Characters  │ -> │   Window    │ -> │   Scanner   │ -> │   Tokens    │
 * │ (Source)    │    │ (Lookahead) │    │ (States)    │    │ (Marked)    │
 * └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
 *
 * TOKEN CATEGORIES:
 * - 🔤 SUBSTANTIVE: Uri, Comment, TagName, TagValue, AttributeName,
 *       AttributeValue, QuotedAttributeValue
 * - 🧱 STRUCTURAL: markers, separators, terminators, EndOfLine, EndOfFile
 *       (suppressed unless the scanner runs verbose)
 * - ⚠️ UnexpectedData: junk between a closing quote and the next delimiter;
 *       always surfaced, never an error
 */

use serde::{Deserialize, Serialize};

use crate::error::ScanResult;
use crate::reader::{CharacterSource, TextSource};
use crate::window::{CharWindow, SENTINEL};

// ===============================================================================
// 🏷️ TOKEN TYPES: HLS lexical elements
// ===============================================================================

/**
 * 🏷️ TOKEN TYPE ENUM: TokenType
 *
 * PURPOSE:
 * - Defines all lexical token types in an HLS playlist line
 * - Direct mapping to the #EXTM3U line grammar
 * - Copy + PartialEq for cheap dispatch and comparison
 *
 * TOKEN CATEGORIES:
 * 🔤 SUBSTANTIVE: carry playlist content, always returned
 * 🧱 STRUCTURAL: punctuation and terminators, returned only in verbose mode
 * ⚠️ UNEXPECTED: post-quote junk, always returned
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// Exposed before the first successful advance.
    None,

    // 🔤 SUBSTANTIVE TOKENS
    Uri,                  // Non-comment line, possibly empty
    Comment,              // Text after '#' when not an EXT tag
    TagName,              // 'EXT' and the rest of the tag name
    TagValue,             // Free-form payload after ':'
    AttributeName,        // NAME in NAME=VALUE
    AttributeValue,       // Unquoted VALUE
    QuotedAttributeValue, // VALUE between double quotes, quotes excluded

    // 🧱 STRUCTURAL TOKENS
    CommentMarker,                 // '#'
    TagNameValueSeparator,         // ':'
    AttributeNameValueSeparator,   // '='
    QuotedAttributeValueMarker,    // opening '"'
    QuotedAttributeValueTerminator, // closing '"'
    AttributeSeparator,            // ','
    EndOfLine,                     // "\n" or "\r\n"
    EndOfFile,                     // emitted once, empty value

    // ⚠️ MALFORMED SYNTAX
    UnexpectedData, // between a closing '"' and the next ',' or line break
}

impl TokenType {
    /// Structural tokens are computed in every mode but returned to the
    /// caller only when the scanner runs verbose.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenType::CommentMarker
                | TokenType::TagNameValueSeparator
                | TokenType::AttributeNameValueSeparator
                | TokenType::QuotedAttributeValueMarker
                | TokenType::QuotedAttributeValueTerminator
                | TokenType::AttributeSeparator
                | TokenType::EndOfLine
                | TokenType::EndOfFile
        )
    }

    pub fn is_substantive(self) -> bool {
        matches!(
            self,
            TokenType::Uri
                | TokenType::Comment
                | TokenType::TagName
                | TokenType::TagValue
                | TokenType::AttributeName
                | TokenType::AttributeValue
                | TokenType::QuotedAttributeValue
        )
    }
}

// ===============================================================================
// 📍 MARK: Source position
// ===============================================================================

/// Position in the source text, 1-based on both axes. Tabs count as one
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub line: usize,
    pub column: usize,
}

impl Mark {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ===============================================================================
// 🎫 TOKEN: Complete lexical information
// ===============================================================================

/**
 * 🎫 TOKEN STRUCTURE: Token
 *
 * PURPOSE:
 * - Store complete information for one lexical token
 * - Value objects: owned string, no references into scanner state
 * - Start mark for diagnostics and editor tooling
 *
 * FIELDS:
 * - token_type: Token type (fast discriminator)
 * - value: Verbatim covered substring, case and whitespace preserved
 * - start: Line/column of the first covered character
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub start: Mark,
}

impl Token {
    pub fn is_structural(&self) -> bool {
        self.token_type.is_structural()
    }
}

// ===============================================================================
// 🎛️ OPTIONS
// ===============================================================================

/// Scanner configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScannerOptions {
    /// Return structural tokens too. Off by default: only substantive
    /// tokens and `UnexpectedData` surface.
    pub verbose: bool,
}

impl ScannerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

// ===============================================================================
// 🔄 SCANNER STATES
// ===============================================================================

/// One state per syntactic context. Every state runs to exactly one token
/// emission (or, for `Finished`, to none) inside one internal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScannerState {
    UriOrCommentMarker,
    CommentOrTagName,
    TagNameValueSeparator,
    TagValueOrAttributeName,
    AttributeNameValueSeparator,
    AttributeValueOrQuotedAttributeValueMarker,
    QuotedAttributeValue,
    QuotedAttributeValueTerminator,
    UnexpectedPostQuotedAttributeValueTerminatorData,
    AttributeSeparator,
    AttributeName,
    EndOfLine,
    EndOfFile,
    Finished,
}

// ===============================================================================
// 🔍 SCANNER: State machine over the character window
// ===============================================================================

/**
 * 🔍 SCANNER: Scanner<S>
 *
 * PURPOSE:
 * - Main lexical engine for HLS playlist text
 * - Owns the character window exclusively; no shared state
 * - Strictly single-threaded; `advance` mutates
 *
 * FIELDS:
 * - window: Lookahead buffer + line/column bookkeeping
 * - state: Current machine state
 * - verbose: Return structural tokens or skip them
 * - token_anchor: Window offset where the current token begins
 * - token_type / token_value / token_start: Last emitted token
 */
pub struct Scanner<S: CharacterSource> {
    window: CharWindow<S>,
    state: ScannerState,
    verbose: bool,

    token_anchor: usize,
    token_type: TokenType,
    token_value: String,
    token_start: Mark,
}

impl<S: CharacterSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, ScannerOptions::default())
    }

    pub fn with_options(source: S, options: ScannerOptions) -> Self {
        Self {
            window: CharWindow::new(source),
            state: ScannerState::UriOrCommentMarker,
            verbose: options.verbose,
            token_anchor: 0,
            token_type: TokenType::None,
            token_value: String::new(),
            token_start: Mark::new(1, 1),
        }
    }

    /**
     * 🔄 ADVANCE: advance()
     *
     * PURPOSE:
     * - Run the state machine until one caller-visible token is emitted
     * - `Ok(false)` once the stream is exhausted
     * - A source failure propagates once; afterwards the scanner is stuck
     *   in its finished state and reports no more tokens
     */
    pub fn advance(&mut self) -> ScanResult<bool> {
        loop {
            if self.state == ScannerState::Finished {
                return Ok(false);
            }
            match self.step() {
                Ok(Some(token_type)) => {
                    if self.verbose || !token_type.is_structural() {
                        return Ok(true);
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    self.state = ScannerState::Finished;
                    return Err(error);
                }
            }
        }
    }

    /// `advance` plus a snapshot of the emitted token.
    pub fn read_token(&mut self) -> ScanResult<Option<Token>> {
        if self.advance()? {
            Ok(Some(self.token()))
        } else {
            Ok(None)
        }
    }

    /// Read tokens until the stream is exhausted, preserving order.
    pub fn drain(&mut self) -> ScanResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.read_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Line immediately following the last consumed character, 1-based.
    pub fn line(&self) -> usize {
        self.window.line()
    }

    /// Column immediately following the last consumed character, 1-based.
    pub fn column(&self) -> usize {
        self.window.column()
    }

    /// Type of the last emitted token; `TokenType::None` before the first
    /// successful advance.
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    pub fn token_line(&self) -> usize {
        self.token_start.line
    }

    pub fn token_column(&self) -> usize {
        self.token_start.column
    }

    /// Snapshot of the last emitted token as an owned value object.
    pub fn token(&self) -> Token {
        Token {
            token_type: self.token_type,
            value: self.token_value.clone(),
            start: self.token_start,
        }
    }

    // ===================================================================
    // 🔍 STATE DISPATCH
    // ===================================================================

    fn step(&mut self) -> ScanResult<Option<TokenType>> {
        match self.state {
            ScannerState::UriOrCommentMarker => self.scan_uri_or_comment_marker(),
            ScannerState::CommentOrTagName => self.scan_comment_or_tag_name(),
            ScannerState::TagNameValueSeparator => self.scan_tag_name_value_separator(),
            ScannerState::TagValueOrAttributeName => self.scan_tag_value_or_attribute_name(),
            ScannerState::AttributeNameValueSeparator => self.scan_attribute_name_value_separator(),
            ScannerState::AttributeValueOrQuotedAttributeValueMarker => {
                self.scan_attribute_value_or_quote_marker()
            }
            ScannerState::QuotedAttributeValue => self.scan_quoted_attribute_value(),
            ScannerState::QuotedAttributeValueTerminator => {
                self.scan_quoted_attribute_value_terminator()
            }
            ScannerState::UnexpectedPostQuotedAttributeValueTerminatorData => {
                self.scan_unexpected_data()
            }
            ScannerState::AttributeSeparator => self.scan_attribute_separator(),
            ScannerState::AttributeName => self.scan_attribute_name(),
            ScannerState::EndOfLine => self.scan_end_of_line(),
            ScannerState::EndOfFile => self.scan_end_of_file(),
            ScannerState::Finished => Ok(None),
        }
    }

    /// Open a token at the cursor: shift the window if its tail ran low,
    /// then pin the anchor and the start mark. Shifting before the anchor
    /// is pinned is what keeps in-flight lexemes immune to relocation.
    fn begin_token(&mut self) {
        self.window.shift_if_needed();
        self.token_anchor = self.window.cursor();
        self.token_start = Mark::new(self.window.line(), self.window.column());
    }

    /// Snapshot the covered lexeme and take the transition.
    fn emit(&mut self, token_type: TokenType, next: ScannerState) -> TokenType {
        self.token_value = self.window.lexeme(self.token_anchor);
        self.token_type = token_type;
        self.state = next;
        token_type
    }

    /// Consume characters until an optional delimiter, a line break, or the
    /// end of the stream, and return the successor state. The delimiter and
    /// the line break are left unconsumed. A lone CR is a literal character,
    /// not a line break.
    fn scan_until_break(
        &mut self,
        delimiter: Option<(char, ScannerState)>,
    ) -> ScanResult<ScannerState> {
        loop {
            let ch = self.window.current();
            if let Some((delim, next)) = delimiter {
                if ch == delim {
                    return Ok(next);
                }
            }
            match ch {
                '\n' => return Ok(ScannerState::EndOfLine),
                '\r' if self.window.has_lookahead(1)? && self.window.char_at(1) == '\n' => {
                    return Ok(ScannerState::EndOfLine)
                }
                SENTINEL if self.window.at_buffer_end() => {
                    if self.window.is_eof()? {
                        return Ok(ScannerState::EndOfFile);
                    }
                }
                _ => self.window.bump(),
            }
        }
    }

    // ===================================================================
    // 🔍 PER-STATE SCANNERS
    // ===================================================================

    /// Start of a logical line: '#' opens a comment or tag, anything else
    /// is a URI line. An empty line yields an empty `Uri`; immediate end of
    /// stream yields no token and falls through to `EndOfFile`.
    fn scan_uri_or_comment_marker(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        if !self.window.has_lookahead(0)? {
            self.state = ScannerState::EndOfFile;
            return Ok(None);
        }
        if self.window.current() == '#' {
            self.window.bump();
            return Ok(Some(
                self.emit(TokenType::CommentMarker, ScannerState::CommentOrTagName),
            ));
        }
        let next = self.scan_until_break(None)?;
        Ok(Some(self.emit(TokenType::Uri, next)))
    }

    /// Just after '#': the next three characters decide tag versus comment.
    /// A tag name runs to ':', the line break, or the end of the stream;
    /// `#EXT` directly at the end of the stream is still a tag name. A
    /// comment covers at least one character; a bare '#' yields no comment
    /// token, only the transition.
    fn scan_comment_or_tag_name(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        let is_tag = self.window.has_lookahead(2)?
            && self.window.char_at(0) == 'E'
            && self.window.char_at(1) == 'X'
            && self.window.char_at(2) == 'T';
        if is_tag {
            let next =
                self.scan_until_break(Some((':', ScannerState::TagNameValueSeparator)))?;
            return Ok(Some(self.emit(TokenType::TagName, next)));
        }
        let next = self.scan_until_break(None)?;
        if self.window.cursor() == self.token_anchor {
            self.state = next;
            return Ok(None);
        }
        Ok(Some(self.emit(TokenType::Comment, next)))
    }

    fn scan_tag_name_value_separator(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        self.window.bump(); // ':' under the cursor
        Ok(Some(self.emit(
            TokenType::TagNameValueSeparator,
            ScannerState::TagValueOrAttributeName,
        )))
    }

    /**
     * 🧠 CONTEXTUAL DISAMBIGUATION: scan_tag_value_or_attribute_name()
     *
     * The payload after ':' is tentatively an attribute name until the
     * first '='. At that moment the accumulated run decides: a non-empty
     * run of [A-Z0-9-] characters makes it an `AttributeName` and opens
     * attribute-list mode; an empty run or anything else latches the whole
     * payload as a `TagValue`, and later '=' characters are never
     * re-examined. The latch is one-shot: "#EXTINF:3.2,Title with = sign"
     * is a single tag value.
     */
    fn scan_tag_value_or_attribute_name(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        let mut latched = false;
        let mut name_shaped = true;
        loop {
            let ch = self.window.current();
            match ch {
                '=' if !latched => {
                    if name_shaped && self.window.cursor() != self.token_anchor {
                        return Ok(Some(self.emit(
                            TokenType::AttributeName,
                            ScannerState::AttributeNameValueSeparator,
                        )));
                    }
                    latched = true;
                    self.window.bump();
                }
                '\n' => {
                    return Ok(Some(self.emit(TokenType::TagValue, ScannerState::EndOfLine)))
                }
                '\r' if self.window.has_lookahead(1)? && self.window.char_at(1) == '\n' => {
                    return Ok(Some(self.emit(TokenType::TagValue, ScannerState::EndOfLine)))
                }
                SENTINEL if self.window.at_buffer_end() => {
                    if self.window.is_eof()? {
                        return Ok(Some(
                            self.emit(TokenType::TagValue, ScannerState::EndOfFile),
                        ));
                    }
                }
                _ => {
                    name_shaped = name_shaped && matches!(ch, 'A'..='Z' | '0'..='9' | '-');
                    self.window.bump();
                }
            }
        }
    }

    fn scan_attribute_name_value_separator(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        self.window.bump(); // '=' under the cursor
        Ok(Some(self.emit(
            TokenType::AttributeNameValueSeparator,
            ScannerState::AttributeValueOrQuotedAttributeValueMarker,
        )))
    }

    /// Just after '=': '"' opens a quoted value, anything else is an
    /// unquoted value running to ',', the line break, or the end of the
    /// stream. The unquoted value may be empty.
    fn scan_attribute_value_or_quote_marker(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        if self.window.has_lookahead(0)? && self.window.current() == '"' {
            self.window.bump();
            return Ok(Some(self.emit(
                TokenType::QuotedAttributeValueMarker,
                ScannerState::QuotedAttributeValue,
            )));
        }
        let next = self.scan_until_break(Some((',', ScannerState::AttributeSeparator)))?;
        Ok(Some(self.emit(TokenType::AttributeValue, next)))
    }

    /// Inside quotes. Ends at the next '"', the line break, or the end of
    /// the stream, whichever comes first; when unterminated, the partial
    /// content is the token and no terminator is synthesized. Empty quoted
    /// content yields no value token, only the transition.
    fn scan_quoted_attribute_value(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        let next =
            self.scan_until_break(Some(('"', ScannerState::QuotedAttributeValueTerminator)))?;
        if self.window.cursor() == self.token_anchor {
            self.state = next;
            return Ok(None);
        }
        Ok(Some(self.emit(TokenType::QuotedAttributeValue, next)))
    }

    /// The closing '"' is its own token; whatever follows picks the
    /// successor, with junk routed through `UnexpectedData`.
    fn scan_quoted_attribute_value_terminator(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        self.window.bump(); // closing '"'
        let next = if !self.window.has_lookahead(0)? {
            ScannerState::EndOfFile
        } else {
            match self.window.current() {
                ',' => ScannerState::AttributeSeparator,
                '\n' => ScannerState::EndOfLine,
                '\r' if self.window.has_lookahead(1)? && self.window.char_at(1) == '\n' => {
                    ScannerState::EndOfLine
                }
                _ => ScannerState::UnexpectedPostQuotedAttributeValueTerminatorData,
            }
        };
        Ok(Some(
            self.emit(TokenType::QuotedAttributeValueTerminator, next),
        ))
    }

    fn scan_unexpected_data(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        let next = self.scan_until_break(Some((',', ScannerState::AttributeSeparator)))?;
        Ok(Some(self.emit(TokenType::UnexpectedData, next)))
    }

    fn scan_attribute_separator(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        self.window.bump(); // ',' under the cursor
        Ok(Some(self.emit(
            TokenType::AttributeSeparator,
            ScannerState::AttributeName,
        )))
    }

    /// After ',': the name runs to '=', the line break, or the end of the
    /// stream. Attribute-list mode never demotes back to a tag value, and
    /// the name covers at least one character: a '=' directly after the ','
    /// is name text, and a bare line break or end of stream yields no name
    /// token at all.
    fn scan_attribute_name(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        if self.window.has_lookahead(0)? && self.window.current() == '=' {
            self.window.bump();
        }
        let next =
            self.scan_until_break(Some(('=', ScannerState::AttributeNameValueSeparator)))?;
        if self.window.cursor() == self.token_anchor {
            self.state = next;
            return Ok(None);
        }
        Ok(Some(self.emit(TokenType::AttributeName, next)))
    }

    /// Consume "\n" or "\r\n" as one unit; this is the only place the line
    /// counter advances. The token starts at the line break's own mark.
    fn scan_end_of_line(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        if self.window.current() == '\r' {
            self.window.bump();
        }
        self.window.bump(); // the LF
        self.window.mark_line_break();
        Ok(Some(
            self.emit(TokenType::EndOfLine, ScannerState::UriOrCommentMarker),
        ))
    }

    fn scan_end_of_file(&mut self) -> ScanResult<Option<TokenType>> {
        self.begin_token();
        Ok(Some(self.emit(TokenType::EndOfFile, ScannerState::Finished)))
    }
}

// ===============================================================================
// 🚀 CONVENIENCE ENTRY
// ===============================================================================

/// Scan an in-memory playlist to completion.
pub fn scan_text(text: impl Into<String>, options: ScannerOptions) -> ScanResult<Vec<Token>> {
    Scanner::with_options(TextSource::new(text), options).drain()
}
