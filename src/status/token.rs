//! Tokenizer for `RS` (rdstat) replies.
//!
//! The controller does not reliably separate the per-axis results of an `RS`
//! command with whitespace. Asking for `RS X Y? Z` can produce `:A  10N 138`,
//! where the detailed status of `X` (`10`) runs straight into the coarse
//! status of `Y` (`N`). The reply is therefore re-segmented by character
//! class rather than split on whitespace.

/// A token in an `RS` reply.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Token {
	/// A run of ASCII digits: a decimal status byte
	Number,
	/// A single `B` or `N`: a coarse status
	Marker,
	/// A run of whitespace
	Separator,
	/// A run of any other characters, such as the leading `:A`
	Other,
}

/// An iterator over the tokens in an `RS` reply.
///
/// ```
/// # use asitiger::status::token::{Token, TokenIter};
/// let tokens: Vec<_> = TokenIter::new(":A  10N 138").collect();
/// assert_eq!(tokens, &[
///     (Token::Other, ":A"),
///     (Token::Separator, "  "),
///     (Token::Number, "10"),
///     (Token::Marker, "N"),
///     (Token::Separator, " "),
///     (Token::Number, "138"),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct TokenIter<'a> {
	rest: &'a str,
}

impl<'a> TokenIter<'a> {
	/// Tokenize `reply`.
	pub fn new(reply: &'a str) -> Self {
		TokenIter { rest: reply }
	}
}

fn is_marker(c: char) -> bool {
	c == 'B' || c == 'N'
}

fn classify(c: char) -> Token {
	if c.is_ascii_digit() {
		Token::Number
	} else if is_marker(c) {
		Token::Marker
	} else if c.is_whitespace() {
		Token::Separator
	} else {
		Token::Other
	}
}

impl<'a> Iterator for TokenIter<'a> {
	type Item = (Token, &'a str);

	fn next(&mut self) -> Option<Self::Item> {
		let first = self.rest.chars().next()?;
		let token = classify(first);
		let len = if token == Token::Marker {
			first.len_utf8()
		} else {
			self.rest
				.char_indices()
				.find(|(_, c)| classify(*c) != token)
				.map_or(self.rest.len(), |(i, _)| i)
		};
		let (text, rest) = self.rest.split_at(len);
		self.rest = rest;
		Some((token, text))
	}
}

/// The non-whitespace tokens of an `RS` reply, in order.
pub fn words(reply: &str) -> impl Iterator<Item = &str> {
	TokenIter::new(reply).filter_map(|(token, text)| (token != Token::Separator).then_some(text))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn adjacent_results_are_split() {
		assert_eq!(
			words(":A  10N 138").collect::<Vec<_>>(),
			[":A", "10", "N", "138"]
		);
	}

	#[test]
	fn consecutive_markers_are_separate() {
		assert_eq!(words(":A NB").collect::<Vec<_>>(), [":A", "N", "B"]);
		assert_eq!(words(":ABN2").collect::<Vec<_>>(), [":A", "B", "N", "2"]);
	}

	#[test]
	fn other_runs_stop_at_digits_and_markers() {
		assert_eq!(
			TokenIter::new("xy7Bz").collect::<Vec<_>>(),
			[
				(Token::Other, "xy"),
				(Token::Number, "7"),
				(Token::Marker, "B"),
				(Token::Other, "z"),
			]
		);
	}

	#[test]
	fn empty_reply() {
		assert_eq!(TokenIter::new("").next(), None);
		assert_eq!(words(" \t ").count(), 0);
	}
}
