//! Grouping beats into expansion windows.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A group of beat indices expanded by a single completion call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Window {
    /// Indices into the beat sequence, in the order they are presented
    indices: Vec<usize>,
    /// Whether this window is rendered with the opening template
    opening: bool,
}

impl Window {
    /// Create a window over `indices`.
    pub fn new(indices: Vec<usize>, opening: bool) -> Self {
        Self { indices, opening }
    }

    /// Number of beats in the window.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the window references no beats.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The beats this window references, joined by newlines.
    ///
    /// Out-of-range indices are skipped.
    pub fn text(&self, beats: &[String]) -> String {
        self.indices
            .iter()
            .filter_map(|&i| beats.get(i).map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// How a stage bundles beats into windows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Detailed-outline expansion.
    ///
    /// With three or more beats, the first window previews the boundary
    /// beats `[0, n-2, n-1]`. The sweep then starts at index 1 with width 1
    /// at index 1 and at the last two indices, width 2 everywhere else. The
    /// last two beats are therefore covered twice; beat 0 only appears in
    /// the preview.
    Outline,
    /// Prose expansion: one window per beat.
    Prose,
}

impl WindowPolicy {
    /// Plan the windows for a sequence of `n` beats.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyloom_narrative::WindowPolicy;
    ///
    /// let windows = WindowPolicy::Outline.plan(4);
    /// let indices: Vec<_> = windows.iter().map(|w| w.indices().clone()).collect();
    /// assert_eq!(indices, vec![vec![0, 2, 3], vec![1], vec![2], vec![3]]);
    /// assert!(*windows[0].opening());
    /// ```
    pub fn plan(self, n: usize) -> Vec<Window> {
        let windows = match self {
            Self::Outline => plan_outline(n),
            Self::Prose => (0..n).map(|i| Window::new(vec![i], i == 0)).collect(),
        };
        tracing::debug!(policy = %self, beats = n, windows = windows.len(), "Planned windows");
        windows
    }
}

fn plan_outline(n: usize) -> Vec<Window> {
    let mut windows = Vec::new();

    let mut i = if n >= 3 {
        windows.push(Window::new(vec![0, n - 2, n - 1], true));
        1
    } else {
        0
    };

    while i < n {
        let width = if n < 3 || i == 1 || i + 2 >= n { 1 } else { 2 };
        let end = (i + width).min(n);
        let opening = windows.is_empty();
        windows.push(Window::new((i..end).collect(), opening));
        i = end;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(windows: &[Window]) -> Vec<Vec<usize>> {
        windows.iter().map(|w| w.indices().clone()).collect()
    }

    #[test]
    fn test_outline_three_beats() {
        let windows = WindowPolicy::Outline.plan(3);
        assert_eq!(indices(&windows), vec![vec![0, 1, 2], vec![1], vec![2]]);
    }

    #[test]
    fn test_outline_seven_beats_pairs_in_middle() {
        let windows = WindowPolicy::Outline.plan(7);
        assert_eq!(
            indices(&windows),
            vec![vec![0, 5, 6], vec![1], vec![2, 3], vec![4, 5], vec![6]]
        );
    }

    #[test]
    fn test_outline_short_sequences() {
        assert!(WindowPolicy::Outline.plan(0).is_empty());
        assert_eq!(indices(&WindowPolicy::Outline.plan(1)), vec![vec![0]]);
        assert_eq!(indices(&WindowPolicy::Outline.plan(2)), vec![vec![0], vec![1]]);
        assert!(*WindowPolicy::Outline.plan(2)[0].opening());
        assert!(!*WindowPolicy::Outline.plan(2)[1].opening());
    }

    #[test]
    fn test_window_text_joins_beats() {
        let beats = vec!["# A".to_string(), "# B".to_string()];
        let window = Window::new(vec![1, 0], false);
        assert_eq!(window.text(&beats), "# B\n# A");
    }
}
