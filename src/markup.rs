//! Parser for Discogs bracket-tag markup.
//!
//! Discogs artist biographies (and release notes) embed links and
//! cross-references in a bespoke bracket syntax such as `[a=Radiohead]`,
//! `[r12345]` or `[url=https://example.com]a link[/url]`. [`parse_markup`]
//! turns such text into an ordered list of typed [`Segment`]s that any
//! rendering layer can consume.
//!
//! The parser only extracts identifiers. Turning a reference id into a
//! display name needs catalog data, which is the job of
//! [`references`](crate::references).
//!
//! # Examples
//!
//! ```rust
//! use record_scrobbler::markup::{parse_markup, SegmentKind};
//!
//! let segments = parse_markup("[b]Hello[/b] World");
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[0].kind, SegmentKind::Bold);
//! assert_eq!(segments[0].text, "Hello");
//! assert_eq!(segments[1].kind, SegmentKind::PlainText);
//! assert_eq!(segments[1].text, " World");
//! ```

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

/// The kind of a parsed markup segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Untagged text between (or around) tags
    PlainText,
    /// `[url=TARGET]LABEL[/url]`
    Hyperlink,
    /// `[a=NAME]` or `[aID]`
    ArtistRef,
    /// `[r=ID]` or `[rID]`
    ReleaseRef,
    /// `[mID]` or `[m=ID]`
    MasterRef,
    /// `[l=NAME]` or `[lID]`
    LabelRef,
    /// `[i]TEXT[/i]`
    Emphasis,
    /// `[b]TEXT[/b]`
    Bold,
    /// `[u]TEXT[/u]`
    Timespan,
}

/// One typed unit of parsed markup.
///
/// Segments are produced by [`parse_markup`] in source order and their
/// `span`s tile the input: joining the source text of every span gives back
/// the original string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// What this segment represents
    pub kind: SegmentKind,
    /// Display text.
    ///
    /// For id-only references this is a placeholder such as `Artist 12345`
    /// (empty for releases) that the caller replaces once the name is known.
    pub text: String,
    /// Absolute URL, only set for [`SegmentKind::Hyperlink`]
    pub target_url: Option<String>,
    /// Catalog identifier, only set for references written in id form
    pub reference_id: Option<String>,
    /// Byte range of the source text this segment was parsed from
    pub span: Range<usize>,
}

impl Segment {
    fn plain(source: &str, span: Range<usize>) -> Self {
        Self {
            kind: SegmentKind::PlainText,
            text: source[span.clone()].to_string(),
            target_url: None,
            reference_id: None,
            span,
        }
    }

    /// Whether this segment points at another catalog entity.
    pub fn is_reference(&self) -> bool {
        matches!(
            self.kind,
            SegmentKind::ArtistRef
                | SegmentKind::ReleaseRef
                | SegmentKind::MasterRef
                | SegmentKind::LabelRef
        )
    }

    /// Whether the display name of this reference still has to be looked up.
    ///
    /// `[a=Name]` style references carry their own name and return `false`.
    pub fn needs_resolution(&self) -> bool {
        self.is_reference() && self.reference_id.is_some()
    }

    /// The raw markup this segment was parsed from.
    ///
    /// `source` must be the string that was passed to [`parse_markup`].
    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.clone()).unwrap_or_default()
    }
}

/// How a grammar's capture groups map onto segment fields.
#[derive(Debug, Clone, Copy)]
enum Capture {
    /// Group 1 is the target URL, group 2 the label
    Link,
    /// Group 1 is a literal display name
    Name,
    /// Group 1 is an identifier; the placeholder prefix builds `"{prefix} {id}"`
    Id { placeholder: Option<&'static str> },
    /// Group 1 is the enclosed text
    Content,
}

struct TagGrammar {
    kind: SegmentKind,
    pattern: Regex,
    capture: Capture,
}

impl TagGrammar {
    fn new(kind: SegmentKind, pattern: &str, capture: Capture) -> Self {
        Self {
            kind,
            pattern: Regex::new(pattern).expect("tag grammar must be a valid regex"),
            capture,
        }
    }

    fn build(&self, caps: &Captures<'_>, span: Range<usize>) -> Segment {
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();

        let (text, target_url, reference_id) = match self.capture {
            Capture::Link => (group(2), Some(group(1)), None),
            Capture::Name => (group(1), None, None),
            Capture::Id { placeholder } => {
                let id = group(1);
                let text = placeholder
                    .map(|prefix| format!("{prefix} {id}"))
                    .unwrap_or_default();
                (text, None, Some(id))
            }
            Capture::Content => (group(1), None, None),
        };

        Segment {
            kind: self.kind,
            text,
            target_url,
            reference_id,
            span,
        }
    }
}

/// Tag grammars in priority order. When two matches start at the same
/// offset the one declared first wins.
static GRAMMARS: LazyLock<Vec<TagGrammar>> = LazyLock::new(|| {
    use SegmentKind::*;
    vec![
        TagGrammar::new(Hyperlink, r"\[url=([^\]]+)\]([^\[]+)\[/url\]", Capture::Link),
        TagGrammar::new(ArtistRef, r"\[a=([^\]]+)\]", Capture::Name),
        TagGrammar::new(
            ArtistRef,
            r"\[a(\d+)\]",
            Capture::Id {
                placeholder: Some("Artist"),
            },
        ),
        TagGrammar::new(
            ReleaseRef,
            r"\[r=([^\]]+)\]",
            Capture::Id { placeholder: None },
        ),
        TagGrammar::new(ReleaseRef, r"\[r(\d+)\]", Capture::Id { placeholder: None }),
        TagGrammar::new(
            MasterRef,
            r"\[m=?(\d+)\]",
            Capture::Id {
                placeholder: Some("Master"),
            },
        ),
        TagGrammar::new(LabelRef, r"\[l=([^\]]+)\]", Capture::Name),
        TagGrammar::new(
            LabelRef,
            r"\[l(\d+)\]",
            Capture::Id {
                placeholder: Some("Label"),
            },
        ),
        TagGrammar::new(Emphasis, r"\[i\]([^\[]+)\[/i\]", Capture::Content),
        TagGrammar::new(Bold, r"\[b\]([^\[]+)\[/b\]", Capture::Content),
        TagGrammar::new(Timespan, r"\[u\]([^\[]+)\[/u\]", Capture::Content),
    ]
});

struct TagMatch {
    priority: usize,
    segment: Segment,
}

/// Parse Discogs bracket-tag markup into an ordered list of segments.
///
/// Each tag grammar is scanned across the whole input, the matches are
/// sorted by start offset (ties broken by grammar priority) and the gaps
/// between them become [`SegmentKind::PlainText`] segments. Malformed or
/// unknown tags never match and stay in the plain text.
///
/// If two matches from different grammars overlap (only possible with
/// malformed markup), the later one is dropped and its text remains part of
/// the earlier segment or the following plain text.
///
/// The result is never empty: input without any tags, including the empty
/// string, yields exactly one plain text segment equal to the input.
pub fn parse_markup(text: &str) -> Vec<Segment> {
    let mut matches: Vec<TagMatch> = Vec::new();

    for (priority, grammar) in GRAMMARS.iter().enumerate() {
        for caps in grammar.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            matches.push(TagMatch {
                priority,
                segment: grammar.build(&caps, whole.range()),
            });
        }
    }

    log::trace!("Found {} markup tags in {} bytes", matches.len(), text.len());

    matches.sort_by_key(|m| (m.segment.span.start, m.priority));

    let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut consumed = 0;

    for tag in matches {
        let span = tag.segment.span.clone();
        if span.start < consumed {
            log::trace!(
                "Skipping {:?} tag at {}..{} overlapping previous tag",
                tag.segment.kind,
                span.start,
                span.end
            );
            continue;
        }

        if consumed < span.start {
            segments.push(Segment::plain(text, consumed..span.start));
        }
        segments.push(tag.segment);
        consumed = span.end;
    }

    if consumed < text.len() || segments.is_empty() {
        segments.push(Segment::plain(text, consumed..text.len()));
    }

    segments
}
