//! Timeline markers (global coordinates, independent of tracks).

use serde::{Deserialize, Serialize};

use crate::Frame;

/// A point (`start == end`) or inclusive range annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub text: String,
    pub start: Frame,
    pub end: Frame,
    pub color: u32,
}

impl Marker {
    pub fn point(text: impl Into<String>, at: Frame) -> Self {
        Self::range(text, at, at)
    }

    pub fn range(text: impl Into<String>, start: Frame, end: Frame) -> Self {
        Self {
            text: text.into(),
            start,
            end: end.max(start),
            color: 0x00ff_0000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    list: Vec<Marker>,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.list.get(index)
    }

    pub fn push(&mut self, marker: Marker) {
        self.list.push(marker);
    }

    pub fn set_markers(&mut self, list: Vec<Marker>) {
        self.list = list;
    }

    /// Rewrite every marker in place; `None` deletes it. Order is preserved.
    pub fn retain_map(&mut self, mut f: impl FnMut(Marker) -> Option<Marker>) {
        self.list = std::mem::take(&mut self.list)
            .into_iter()
            .filter_map(&mut f)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_map_deletes_and_rewrites() {
        let mut m = Markers::new();
        m.push(Marker::point("a", 1));
        m.push(Marker::point("b", 2));
        m.retain_map(|mut mk| {
            if mk.text == "a" {
                return None;
            }
            mk.start += 10;
            mk.end += 10;
            Some(mk)
        });
        assert_eq!(m.markers(), &[Marker::point("b", 12)]);
    }

    #[test]
    fn range_never_ends_before_start() {
        let m = Marker::range("r", 10, 5);
        assert_eq!((m.start, m.end), (10, 10));
    }
}
