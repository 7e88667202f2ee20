//! Auto-fit of a paragraph into a box.
//!
//! The search walks font sizes from the largest down in fixed steps, re-wrapping
//! at each size, and keeps the first size whose wrap fits both dimensions.

pub const DEFAULT_STEP: f64 = 0.1;
/// Finer steps are raised to this; each candidate size costs a full re-wrap.
pub const MIN_STEP: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub lines: Vec<String>,
    pub font_size: f64,
    /// Set when even the minimum size exceeds the box; the lines are the
    /// minimum-size wrap.
    pub overflow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFitter {
    pub min_size: f64,
    pub max_size: f64,
    pub step: f64,
    /// Extra leading added below each line.
    pub line_gap: f64,
}

impl TextFitter {
    pub fn new(min_size: f64, max_size: f64) -> Self {
        Self {
            min_size,
            max_size,
            step: DEFAULT_STEP,
            line_gap: 0.0,
        }
    }

    pub fn with_line_gap(mut self, line_gap: f64) -> Self {
        self.line_gap = line_gap;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Height taken by `lines` lines at `size`.
    pub fn block_height(&self, lines: usize, size: f64) -> f64 {
        lines as f64 * (size + self.line_gap)
    }

    /// Pick the largest size in range whose wrap fits `box_width` x `box_height`.
    ///
    /// `measure(text, size)` must return the rendered width of `text`.
    pub fn fit<M>(&self, text: &str, box_width: f64, box_height: f64, measure: M) -> FitResult
    where
        M: Fn(&str, f64) -> f64,
    {
        for size in self.candidate_sizes() {
            let lines = wrap(text, box_width, size, &measure);
            if self.fits(&lines, size, box_width, box_height, &measure) {
                return FitResult {
                    lines,
                    font_size: size,
                    overflow: false,
                };
            }
        }

        let size = self.min_size;
        FitResult {
            lines: wrap(text, box_width, size, &measure),
            font_size: size,
            overflow: true,
        }
    }

    fn fits<M>(&self, lines: &[String], size: f64, box_width: f64, box_height: f64, measure: &M) -> bool
    where
        M: Fn(&str, f64) -> f64,
    {
        self.block_height(lines.len(), size) <= box_height
            && lines.iter().all(|line| measure(line, size) <= box_width)
    }

    /// Sizes from `max_size` down to `min_size` inclusive. Computed from the
    /// step index so repeated calls see bit-identical sizes.
    fn candidate_sizes(&self) -> impl Iterator<Item = f64> {
        let (min, max) = (self.min_size, self.max_size.max(self.min_size));
        let step = if self.step > 0.0 { self.step.max(MIN_STEP) } else { DEFAULT_STEP };
        let steps = ((max - min) / step + 1e-9).floor() as usize;
        (0..=steps)
            .map(move |i| (max - i as f64 * step).max(min))
            .chain(std::iter::once(min))
    }
}

/// Greedy word wrap at `size`. A word wider than the box still gets a line
/// of its own.
pub fn wrap<M>(text: &str, box_width: f64, size: f64, measure: &M) -> Vec<String>
where
    M: Fn(&str, f64) -> f64,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if measure(&candidate, size) <= box_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 0.6 em wide.
    fn mono(text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * 0.6 * size
    }

    #[test]
    fn test_wrap_greedy() {
        // 10 chars per line at size 1 with width 6
        let lines = wrap("aaa bbb ccc ddd", 6.0, 1.0, &mono);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_wrap_long_word_alone() {
        let lines = wrap("a supercalifragilistic b", 3.0, 1.0, &mono);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        let lines = wrap("  one\t two \n", 100.0, 1.0, &mono);
        assert_eq!(lines, vec!["one two"]);
        assert!(wrap("   ", 100.0, 1.0, &mono).is_empty());
    }

    #[test]
    fn test_sample_product_fits_at_max() {
        let fitter = TextFitter::new(3.5, 4.5).with_line_gap(1.5);
        let result = fitter.fit("Sample Product", 120.0, 20.0, mono);
        assert_eq!(result.lines, vec!["Sample Product"]);
        assert_eq!(result.font_size, 4.5);
        assert!(!result.overflow);
    }

    #[test]
    fn test_picks_largest_size_that_fits_height() {
        // Two lines of "aaaa" need 2 * size <= 9, so size 4.5 is the largest.
        let fitter = TextFitter::new(3.0, 6.0);
        let result = fitter.fit("aaaa aaaa", 2.4 * 6.0 * 1.4, 9.0, mono);
        assert!(!result.overflow);
        assert!(result.font_size <= 4.5 + 1e-9);
        assert!(result.font_size > 4.4);
        let height = fitter.block_height(result.lines.len(), result.font_size);
        assert!(height <= 9.0);
    }

    #[test]
    fn test_shrinks_to_reduce_line_count() {
        // At 6 the text needs two lines (too tall); at a smaller size one line fits.
        let fitter = TextFitter::new(2.0, 6.0);
        let text = "abcde fghij";
        let result = fitter.fit(text, 25.0, 6.0, mono);
        assert_eq!(result.lines, vec!["abcde fghij"]);
        assert!(mono(text, result.font_size) <= 25.0);
        assert!(!result.overflow);
        // one step larger would not fit on a single line
        assert!(mono(text, result.font_size + 0.1) > 25.0);
    }

    #[test]
    fn test_overflow_falls_back_to_min_size() {
        let fitter = TextFitter::new(3.5, 4.5);
        let text = "a very long product description that cannot possibly fit";
        let result = fitter.fit(text, 20.0, 4.0, mono);
        assert!(result.overflow);
        assert_eq!(result.font_size, 3.5);
        assert_eq!(result.lines, wrap(text, 20.0, 3.5, &mono));
    }

    #[test]
    fn test_fit_is_idempotent() {
        let fitter = TextFitter::new(3.5, 6.0).with_line_gap(1.5);
        let text = "Stainless steel water bottle, double walled, 750 ml";
        let a = fitter.fit(text, 60.0, 20.0, mono);
        let b = fitter.fit(text, 60.0, 20.0, mono);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sizes_stay_in_range() {
        let fitter = TextFitter::new(3.5, 4.5).with_step(0.2);
        let sizes: Vec<f64> = fitter.candidate_sizes().collect();
        assert_eq!(sizes.first().copied(), Some(4.5));
        assert_eq!(sizes.last().copied(), Some(3.5));
        assert!(sizes.iter().all(|&s| (3.5 - 1e-9..=4.5).contains(&s)));
    }

    #[test]
    fn test_tiny_step_is_clamped() {
        let fitter = TextFitter::new(3.5, 6.0).with_step(1e-9);
        // (6.0 - 3.5) / 0.01 steps, plus the first size and the trailing min
        assert_eq!(fitter.candidate_sizes().count(), 252);
        let result = fitter.fit("Sample Product", 1.0, 1.0, mono);
        assert!(result.overflow);
        assert_eq!(result.font_size, 3.5);
    }

    #[test]
    fn test_inverted_range_collapses_to_min() {
        let fitter = TextFitter::new(5.0, 4.0);
        let result = fitter.fit("x", 100.0, 100.0, mono);
        assert_eq!(result.font_size, 5.0);
    }

    #[test]
    fn test_empty_text() {
        let fitter = TextFitter::new(3.5, 6.0);
        let result = fitter.fit("", 10.0, 10.0, mono);
        assert!(result.lines.is_empty());
        assert_eq!(result.font_size, 6.0);
        assert!(!result.overflow);
    }
}
