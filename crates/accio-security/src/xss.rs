//! XSS prevention: escaping, pattern detection and the configurable
//! [`sanitize`] pipeline for user-supplied text.

use regex::Regex;
use std::sync::OnceLock;

/// Default maximum length of sanitized output, in characters
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Policy for [`sanitize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
	/// Keep markup as-is instead of escaping `< > " ' &`
	pub allow_html: bool,
	/// Output length limit in characters, applied after trimming
	pub max_length: usize,
	/// Remove script/iframe blocks, dangerous URL schemes and inline event handlers
	pub strip_scripts: bool,
	/// Keep line breaks; otherwise every whitespace run becomes one space
	pub preserve_line_breaks: bool,
}

impl Default for SanitizeOptions {
	fn default() -> Self {
		Self {
			allow_html: false,
			max_length: DEFAULT_MAX_LENGTH,
			strip_scripts: true,
			preserve_line_breaks: false,
		}
	}
}

impl SanitizeOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_allow_html(mut self, allow_html: bool) -> Self {
		self.allow_html = allow_html;
		self
	}

	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.max_length = max_length;
		self
	}

	pub fn with_strip_scripts(mut self, strip_scripts: bool) -> Self {
		self.strip_scripts = strip_scripts;
		self
	}

	pub fn with_preserve_line_breaks(mut self, preserve_line_breaks: bool) -> Self {
		self.preserve_line_breaks = preserve_line_breaks;
		self
	}
}

/// Escape HTML special characters
///
/// # Examples
///
/// ```
/// use accio_security::xss::escape_html;
///
/// let escaped = escape_html("<script>alert('XSS')</script>");
/// assert_eq!(escaped, "&lt;script&gt;alert(&#x27;XSS&#x27;)&lt;/script&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
	input
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

fn entity_regex() -> &'static Regex {
	static ENTITY: OnceLock<Regex> = OnceLock::new();
	ENTITY.get_or_init(|| Regex::new(r"^&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap())
}

/// Like [`escape_html`], but an `&` that already starts a complete entity
/// is left alone, so escaping twice changes nothing.
fn escape_html_once(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for (idx, ch) in input.char_indices() {
		match ch {
			'&' if entity_regex().is_match(&input[idx..]) => out.push('&'),
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			c => out.push(c),
		}
	}
	out
}

static DANGEROUS_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn get_dangerous_patterns() -> &'static Vec<Regex> {
	DANGEROUS_PATTERNS.get_or_init(|| {
		vec![
			// JavaScript protocol
			Regex::new(r"(?i)javascript\s*:").unwrap(),
			// HTML data URI
			Regex::new(r"(?i)data\s*:\s*text/html").unwrap(),
			// VBScript
			Regex::new(r"(?i)vbscript\s*:").unwrap(),
			// Event handlers
			Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap(),
			// Embedding tags
			Regex::new(r"(?i)<\s*(iframe|embed|object|applet|meta|link|base)").unwrap(),
			Regex::new(r"(?i)<\s*script").unwrap(),
		]
	})
}

/// Detect dangerous patterns
///
/// # Examples
///
/// ```
/// use accio_security::xss::detect_xss_patterns;
///
/// assert!(detect_xss_patterns("<script>alert(1)</script>"));
/// assert!(detect_xss_patterns(r#"<img src=x onerror="alert(1)">"#));
/// assert!(detect_xss_patterns("javascript:alert(1)"));
/// assert!(!detect_xss_patterns("Safe text"));
/// ```
pub fn detect_xss_patterns(input: &str) -> bool {
	get_dangerous_patterns()
		.iter()
		.any(|pattern| pattern.is_match(input))
}

static STRIP_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn get_strip_patterns() -> &'static Vec<Regex> {
	STRIP_PATTERNS.get_or_init(|| {
		vec![
			// Whole script/iframe elements, contents included
			Regex::new(r"(?is)<\s*(?:script|iframe)\b[^>]*>.*?<\s*/\s*(?:script|iframe)\s*>")
				.unwrap(),
			// Unbalanced openers or closers left behind
			Regex::new(r"(?i)<\s*/?\s*(?:script|iframe)").unwrap(),
			Regex::new(r"(?i)\b(?:javascript|vbscript|data)\s*:").unwrap(),
			// Inline event handlers with their value
			Regex::new(r#"(?i)\bon[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#).unwrap(),
		]
	})
}

/// Cleanup passes that remove matches outright before nested splices are
/// neutralized instead.
const MAX_STRIP_PASSES: usize = 4;

/// Stands in for a removal once the pass budget is spent. Not whitespace
/// and not a word character, so it cannot join the text around it into a
/// new match.
const NEUTRALIZED: &str = "\u{FFFD}";

fn strip_pass(input: &str, replacement: &str) -> String {
	get_strip_patterns()
		.iter()
		.fold(input.to_string(), |text, pattern| {
			pattern.replace_all(&text, replacement).into_owned()
		})
}

/// Removes script and iframe elements, `javascript:` / `vbscript:` /
/// `data:` schemes and inline event handlers.
///
/// A removal can splice a new match together (e.g. `<scr<script>ipt>`), so
/// the cleanup is repeated a few times. Deeper nesting is hostile input: the
/// remaining matches are replaced with U+FFFD, which cannot splice, so the
/// work stays linear in the input length.
///
/// # Examples
///
/// ```
/// use accio_security::xss::strip_dangerous;
///
/// assert_eq!(strip_dangerous("Hi<script>alert(1)</script>!"), "Hi!");
/// assert_eq!(strip_dangerous("<a href=\"javascript:go()\">x</a>"), "<a href=\"go()\">x</a>");
/// ```
pub fn strip_dangerous(input: &str) -> String {
	let mut current = input.to_string();
	for _ in 0..MAX_STRIP_PASSES {
		let next = strip_pass(&current, "");
		if next == current {
			return current;
		}
		current = next;
	}
	loop {
		let next = strip_pass(&current, NEUTRALIZED);
		if next == current {
			return current;
		}
		current = next;
	}
}

fn collapse_whitespace(input: &str, preserve_line_breaks: bool) -> String {
	if preserve_line_breaks {
		input
			.replace("\r\n", "\n")
			.replace('\r', "\n")
			.split('\n')
			.map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
			.collect::<Vec<_>>()
			.join("\n")
	} else {
		input.split_whitespace().collect::<Vec<_>>().join(" ")
	}
}

/// Truncates to `max_length` characters. A cut that lands inside an
/// entity drops the partial entity.
fn truncate_chars(input: &str, max_length: usize) -> String {
	let Some((cut, _)) = input.char_indices().nth(max_length) else {
		return input.to_string();
	};
	let mut truncated = &input[..cut];
	if let Some(amp) = truncated.rfind('&')
		&& truncated[amp + 1..]
			.chars()
			.all(|c| c == '#' || c.is_ascii_alphanumeric())
	{
		truncated = &truncated[..amp];
	}
	truncated.trim_end().to_string()
}

/// Sanitizes untrusted text according to `options`.
///
/// Steps: drop control characters, strip dangerous constructs, escape
/// markup, collapse whitespace, trim, then truncate. The result never
/// exceeds `max_length` characters and sanitizing it again with the same
/// options returns it unchanged.
///
/// # Examples
///
/// ```
/// use accio_security::xss::{SanitizeOptions, sanitize};
///
/// let options = SanitizeOptions::default();
/// assert_eq!(
///     sanitize("<script>alert(1)</script>Hello   <b>world</b>", &options),
///     "Hello &lt;b&gt;world&lt;/b&gt;"
/// );
/// ```
pub fn sanitize(input: &str, options: &SanitizeOptions) -> String {
	let mut text: String = input
		.chars()
		.filter(|c| !c.is_control() || c.is_whitespace())
		.collect();

	if options.strip_scripts {
		text = strip_dangerous(&text);
	}
	if !options.allow_html {
		text = escape_html_once(&text);
	}

	let text = collapse_whitespace(&text, options.preserve_line_breaks);
	truncate_chars(text.trim(), options.max_length)
}

/// Sanitizes with [`SanitizeOptions::default`].
pub fn sanitize_default(input: &str) -> String {
	sanitize(input, &SanitizeOptions::default())
}

/// Sanitizes user input for safe inclusion in log messages.
///
/// Line breaks and tabs become spaces, other control characters become
/// U+FFFD, and the result is cut to `max_length` characters with `...`
/// appended when anything was dropped.
///
/// # Examples
///
/// ```
/// use accio_security::xss::sanitize_log_input;
///
/// let sanitized = sanitize_log_input("admin\nINFO fake entry", 100);
/// assert_eq!(sanitized, "admin INFO fake entry");
/// assert_eq!(sanitize_log_input("abcdef", 3), "abc...");
/// ```
pub fn sanitize_log_input(input: &str, max_length: usize) -> String {
	let mut result = String::with_capacity(input.len().min(max_length));

	for (char_count, ch) in input.chars().enumerate() {
		if char_count >= max_length {
			result.push_str("...");
			break;
		}

		match ch {
			'\n' | '\r' | '\t' => result.push(' '),
			c if c.is_control() => result.push('\u{FFFD}'),
			c => result.push(c),
		}
	}

	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	// ===================================================================
	// sanitize tests
	// ===================================================================

	#[rstest]
	fn test_escapes_markup_by_default() {
		// Act
		let result = sanitize_default(r#"<b>"quoted" & 'single'</b>"#);

		// Assert
		assert_eq!(
			result,
			"&lt;b&gt;&quot;quoted&quot; &amp; &#x27;single&#x27;&lt;/b&gt;"
		);
	}

	#[rstest]
	#[case("<script>alert('xss')</script>", "")]
	#[case("before<SCRIPT type=\"text/javascript\">x()</SCRIPT>after", "beforeafter")]
	#[case("<iframe src=\"https://evil.example\"></iframe>ok", "ok")]
	#[case("<scr<script>x</script>ipt>alert(1)", "&gt;alert(1)")]
	fn test_strips_script_blocks(#[case] input: &str, #[case] expected: &str) {
		// Act
		let result = sanitize_default(input);

		// Assert
		assert_eq!(result, expected);
	}

	#[rstest]
	fn test_strips_event_handlers_and_protocols_with_html_allowed() {
		// Arrange
		let options = SanitizeOptions::default().with_allow_html(true);
		let input = r#"<a href="javascript:steal()" onclick="steal()">link</a>"#;

		// Act
		let result = sanitize(input, &options);

		// Assert
		assert_eq!(result, r#"<a href="steal()" >link</a>"#);
	}

	#[rstest]
	fn test_keeps_scripts_when_stripping_disabled() {
		// Arrange
		let options = SanitizeOptions::default()
			.with_allow_html(true)
			.with_strip_scripts(false);

		// Act
		let result = sanitize("<script>x</script>", &options);

		// Assert
		assert_eq!(result, "<script>x</script>");
	}

	#[rstest]
	fn test_collapses_whitespace() {
		// Act
		let result = sanitize_default("  hello \n\n\t world  ");

		// Assert
		assert_eq!(result, "hello world");
	}

	#[rstest]
	fn test_preserves_line_breaks() {
		// Arrange
		let options = SanitizeOptions::default().with_preserve_line_breaks(true);

		// Act
		let result = sanitize("  first   line \r\nsecond\tline\n", &options);

		// Assert
		assert_eq!(result, "first line\nsecond line");
	}

	#[rstest]
	fn test_removes_control_characters() {
		// Act
		let result = sanitize_default("nul\u{0}byte\u{7}bell");

		// Assert
		assert_eq!(result, "nulbytebell");
	}

	#[rstest]
	fn test_truncates_after_trimming() {
		// Arrange
		let options = SanitizeOptions::default().with_max_length(5);

		// Act
		let result = sanitize("   abcdefgh", &options);

		// Assert
		assert_eq!(result, "abcde");
	}

	#[rstest]
	fn test_truncation_drops_partial_entity() {
		// Arrange: "ab&lt;" is six characters, the cut lands inside the entity
		let options = SanitizeOptions::default().with_max_length(4);

		// Act
		let result = sanitize("ab<cd", &options);

		// Assert
		assert_eq!(result, "ab");
	}

	#[rstest]
	#[case("Tom &amp; Jerry")]
	#[case("&lt;already escaped&gt;")]
	#[case("5 &#60; 6")]
	fn test_existing_entities_are_not_double_escaped(#[case] input: &str) {
		// Act
		let result = sanitize_default(input);

		// Assert
		assert_eq!(result, input);
	}

	#[rstest]
	fn test_is_idempotent_on_mixed_input() {
		// Arrange
		let input = "<p onmouseover='x()'>Hi &  bye</p><script>1</script>";
		let options = SanitizeOptions::default();

		// Act
		let once = sanitize(input, &options);
		let twice = sanitize(&once, &options);

		// Assert
		assert_eq!(once, twice);
	}

	// ===================================================================
	// helper tests
	// ===================================================================

	#[rstest]
	#[case("<embed src=x>", true)]
	#[case("data:text/html;base64,xyz", true)]
	#[case("Let's meet on Monday", false)]
	fn test_detect_xss_patterns(#[case] input: &str, #[case] expected: bool) {
		// Assert
		assert_eq!(detect_xss_patterns(input), expected);
	}

	#[rstest]
	fn test_strip_dangerous_reaches_fixed_point() {
		// Act
		// Removing the handler leaves a bare "<script" behind
		let result = strip_dangerous(r#"<onx=""script>alert(1)"#);

		// Assert
		assert_eq!(result, ">alert(1)");
	}

	#[rstest]
	fn test_deeply_nested_openers_are_neutralized() {
		// Arrange
		let input = format!("{}{}", "<scr".repeat(6), "ipt".repeat(6));

		// Act
		let result = strip_dangerous(&input);

		// Assert
		assert!(!result.to_ascii_lowercase().contains("<script"));
		// Four layers are removed, the fifth is neutralized
		assert_eq!(result, "<scr\u{FFFD}ipt");
	}

	#[rstest]
	fn test_large_nested_input_is_linear() {
		// Arrange
		let n = 20_000;
		let input = format!("{}{}", "<scr".repeat(n), "ipt".repeat(n));
		let started = std::time::Instant::now();

		// Act
		let stripped = strip_dangerous(&input);
		let sanitized = sanitize_default(&input);

		// Assert
		assert!(started.elapsed() < std::time::Duration::from_secs(5));
		assert!(!stripped.to_ascii_lowercase().contains("<script"));
		assert!(sanitized.chars().count() <= DEFAULT_MAX_LENGTH);
		assert_eq!(sanitize_default(&sanitized), sanitized);
	}

	#[rstest]
	fn test_sanitize_log_input_replaces_newlines() {
		// Arrange
		let input = "line1\nline2\rline3\r\nline4";

		// Act
		let result = sanitize_log_input(input, 100);

		// Assert
		assert_eq!(result, "line1 line2 line3  line4");
	}

	#[rstest]
	fn test_sanitize_log_input_replaces_control_chars() {
		// Act
		let result = sanitize_log_input("a\u{1b}[31mb", 100);

		// Assert
		assert_eq!(result, "a\u{FFFD}[31mb");
	}

	#[rstest]
	fn test_sanitize_log_input_counts_characters() {
		// Act
		let result = sanitize_log_input("ééééé", 2);

		// Assert
		assert_eq!(result, "éé...");
	}
}
