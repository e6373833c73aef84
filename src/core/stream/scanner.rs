use crate::common::utils::floor_char_boundary;

/// Position of a marker found in a text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Byte offset of the first marker byte
    pub index: usize,
    /// Byte length of the marker
    pub len: usize,
    /// Declaration index of the marker
    pub marker: usize,
}

impl MarkerMatch {
    /// Byte offset just past the marker.
    #[inline]
    pub const fn end(&self) -> usize { self.index + self.len }
}

/// Marker alternatives searched together
///
/// The earliest occurrence wins; declaration order only breaks ties at the
/// same offset. Empty markers never match.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<String>,
    longest: usize,
}

impl MarkerSet {
    pub fn new(markers: Vec<String>) -> Self {
        let markers: Vec<String> = markers.into_iter().filter(|m| !m.is_empty()).collect();
        let longest = markers.iter().map(String::len).max().unwrap_or(0);
        Self { markers, longest }
    }

    #[inline]
    pub fn is_empty(&self) -> bool { self.markers.is_empty() }

    /// Byte length of the longest marker.
    #[inline]
    pub const fn longest(&self) -> usize { self.longest }

    pub fn find(&self, haystack: &str) -> Option<MarkerMatch> {
        let mut best: Option<MarkerMatch> = None;

        for (marker, needle) in self.markers.iter().enumerate() {
            // a later match can only win with a strictly smaller offset
            let limit = match best {
                Some(m) => (m.index + needle.len()).min(haystack.len()),
                None => haystack.len(),
            };
            let window = &haystack[..floor_char_boundary(haystack, limit)];
            if let Some(index) = window.find(needle.as_str())
                && best.is_none_or(|b| index < b.index)
            {
                best = Some(MarkerMatch { index, len: needle.len(), marker });
            }
        }

        best
    }
}
