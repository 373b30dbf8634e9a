use crate::error::KeyError;

/// Checks one grammar segment: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// `input` is the full key the segment came from and `index` its position,
/// both carried into the error for diagnostics.
pub(crate) fn check_segment(input: &str, index: usize, segment: &str) -> Result<(), KeyError> {
	let mut chars = segment.chars();
	let Some(first) = chars.next() else {
		return Err(KeyError::EmptySegment {
			input: input.to_owned(),
			index,
		});
	};
	if first.is_ascii_digit() {
		return Err(KeyError::LeadingDigit {
			input: input.to_owned(),
			segment: segment.to_owned(),
		});
	}
	for found in std::iter::once(first).chain(chars) {
		if !is_segment_char(found) {
			return Err(KeyError::InvalidCharacter {
				input: input.to_owned(),
				segment: segment.to_owned(),
				found,
			});
		}
	}
	Ok(())
}

fn is_segment_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}
