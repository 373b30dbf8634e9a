//! Positional template rendering for locale text.
//!
//! Templates carry `{0}`-style placeholders; `{{` and `}}` escape literal
//! braces. Translators reorder placeholders freely, which is why indices are
//! explicit rather than positional-by-occurrence.

use std::fmt;

use thiserror::Error;

/// Why a template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
	/// A `{` or `}` with no partner and no escape.
	#[error("unmatched brace at byte {position}")]
	UnmatchedBrace { position: usize },
	/// Placeholder contents that are not a decimal index.
	#[error("placeholder index `{text}` is not a number")]
	BadIndex { text: String },
	/// An index past the end of the argument list.
	#[error("placeholder {{{index}}} has no argument ({provided} provided)")]
	MissingArg { index: usize, provided: usize },
}

/// Renders `template`, substituting `{N}` with `args[N]`.
pub fn render(template: &str, args: &[&dyn fmt::Display]) -> Result<String, FormatError> {
	let mut out = String::with_capacity(template.len());
	let mut chars = template.char_indices().peekable();
	while let Some((position, ch)) = chars.next() {
		match ch {
			'{' => {
				if chars.next_if(|&(_, next)| next == '{').is_some() {
					out.push('{');
					continue;
				}
				let mut text = String::new();
				let mut closed = false;
				for (_, inner) in chars.by_ref() {
					if inner == '}' {
						closed = true;
						break;
					}
					text.push(inner);
				}
				if !closed {
					return Err(FormatError::UnmatchedBrace { position });
				}
				let index: usize = match text.parse() {
					Ok(index) => index,
					Err(_) => return Err(FormatError::BadIndex { text }),
				};
				let arg = args.get(index).ok_or(FormatError::MissingArg {
					index,
					provided: args.len(),
				})?;
				out.push_str(&arg.to_string());
			}
			'}' => {
				if chars.next_if(|&(_, next)| next == '}').is_some() {
					out.push('}');
				} else {
					return Err(FormatError::UnmatchedBrace { position });
				}
			}
			_ => out.push(ch),
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_text_passes_through() {
		assert_eq!(render("Quit", &[]).unwrap(), "Quit");
		assert_eq!(render("", &[]).unwrap(), "");
	}

	#[test]
	fn substitutes_and_reorders_indices() {
		let rendered = render("{1} before {0}", &[&"B", &"A"]).unwrap();
		assert_eq!(rendered, "A before B");
		// The same index may appear more than once.
		let rendered = render("{0} and {0}", &[&7]).unwrap();
		assert_eq!(rendered, "7 and 7");
	}

	#[test]
	fn doubled_braces_escape() {
		let rendered = render("{{{0}}}", &[&"x"]).unwrap();
		assert_eq!(rendered, "{x}");
		assert_eq!(render("100%}} {{done", &[]).unwrap(), "100%} {done");
	}

	#[test]
	fn unmatched_braces_are_rejected() {
		assert_eq!(
			render("left {0", &[&1]),
			Err(FormatError::UnmatchedBrace { position: 5 })
		);
		assert_eq!(
			render("right }", &[]),
			Err(FormatError::UnmatchedBrace { position: 6 })
		);
	}

	#[test]
	fn non_numeric_index_is_rejected() {
		assert_eq!(
			render("{name}", &[]),
			Err(FormatError::BadIndex {
				text: "name".to_owned(),
			})
		);
		assert_eq!(
			render("{}", &[]),
			Err(FormatError::BadIndex {
				text: String::new(),
			})
		);
	}

	#[test]
	fn missing_argument_is_rejected() {
		assert_eq!(
			render("{0} {1}", &[&"only"]),
			Err(FormatError::MissingArg {
				index: 1,
				provided: 1,
			})
		);
	}
}
