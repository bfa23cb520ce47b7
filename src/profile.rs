use crate::markup::{parse_markup, Segment};

/// Longest first paragraph shown before a profile is expanded.
pub const MAX_PROFILE_LENGTH: usize = 320;

/// The part of an artist profile that is currently on display.
///
/// A collapsed profile shows only its first paragraph, cut to
/// [`MAX_PROFILE_LENGTH`] characters with a trailing `...`. An expanded
/// profile shows everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileExcerpt {
    /// Text to parse and display
    pub text: String,
    /// Whether expanding would show more than `text`
    pub has_more: bool,
    /// Whether this excerpt is the expanded view
    pub expanded: bool,
}

impl ProfileExcerpt {
    pub fn new(profile: &str, expanded: bool) -> Self {
        let mut paragraphs = profile.split("\n\n");
        let first = paragraphs.next().unwrap_or_default();
        let has_more_paragraphs = paragraphs.next().is_some();
        let too_long = first.chars().count() > MAX_PROFILE_LENGTH;

        let text = if expanded {
            profile.to_string()
        } else if too_long {
            let cut: String = first.chars().take(MAX_PROFILE_LENGTH).collect();
            format!("{cut}...")
        } else {
            first.to_string()
        };

        Self {
            text,
            has_more: has_more_paragraphs || too_long,
            expanded,
        }
    }

    /// Parsed markup of the displayed text.
    pub fn segments(&self) -> Vec<Segment> {
        parse_markup(&self.text)
    }
}
