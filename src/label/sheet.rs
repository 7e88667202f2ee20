use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use super::composer::LabelComposer;
use super::fields::LabelFields;
use crate::barcode::{self, SymbolCode};
use crate::error::LabelError;
use crate::layout::{layout, Grid, GridSpec};
use crate::surface::{DrawSurface, FontMetrics};

/// Counts from one sheet render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSummary {
    pub pages: usize,
    pub labels_drawn: usize,
    pub labels_skipped: usize,
    pub descriptions_truncated: usize,
}

/// Lays labels out page by page on a fixed grid.
pub struct SheetRenderer<'a, M: FontMetrics + ?Sized> {
    grid: Grid,
    composer: LabelComposer<'a, M>,
    skip_invalid: bool,
}

impl<'a, M: FontMetrics + ?Sized> SheetRenderer<'a, M> {
    /// Fails with `InvalidLayout` when the grid does not fit the page.
    pub fn new(spec: &GridSpec, composer: LabelComposer<'a, M>) -> Result<Self, LabelError> {
        Ok(Self {
            grid: layout(spec)?,
            composer,
            skip_invalid: false,
        })
    }

    /// Leave cells of unencodable labels empty instead of failing the render.
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn labels_per_page(&self) -> usize {
        self.grid.cells.len()
    }

    /// One page with `fields` in every cell.
    pub fn fill_sheet(&self, fields: &LabelFields) -> Vec<LabelFields> {
        vec![fields.clone(); self.labels_per_page()]
    }

    /// Draw `labels` in grid order, asking `new_page` for a fresh surface for
    /// every page. Identifiers are all encoded before the first page is
    /// requested, so an encoding failure leaves no partial output.
    pub fn render<S, F>(&self, labels: &[LabelFields], mut new_page: F) -> Result<(Vec<S>, RenderSummary), LabelError>
    where
        S: DrawSurface,
        F: FnMut(usize) -> S,
    {
        let symbols = self.encode_all(labels)?;
        let mut summary = RenderSummary::default();
        let mut pages = Vec::new();

        for (page_index, chunk) in labels.chunks(self.labels_per_page()).enumerate() {
            let mut surface = new_page(page_index);
            for (offset, (fields, cell)) in chunk.iter().zip(&self.grid.cells).enumerate() {
                let index = page_index * self.labels_per_page() + offset;
                let Some(codes) = symbols.get(fields.identifier.as_str()) else {
                    warn!("Skipping label #{} ({:?}): identifier cannot be encoded", index, fields.identifier);
                    summary.labels_skipped += 1;
                    continue;
                };
                let report = self.composer.compose_encoded(fields, codes, cell, &mut surface);
                summary.labels_drawn += 1;
                if report.description_truncated {
                    summary.descriptions_truncated += 1;
                }
            }
            debug!("Composed page {} with {} labels", page_index + 1, chunk.len());
            pages.push(surface);
        }

        summary.pages = pages.len();
        Ok((pages, summary))
    }

    /// Encode each distinct identifier once.
    fn encode_all<'l>(&self, labels: &'l [LabelFields]) -> Result<HashMap<&'l str, Vec<SymbolCode>>, LabelError> {
        let mut symbols = HashMap::new();
        let mut rejected = HashSet::new();

        for (index, fields) in labels.iter().enumerate() {
            let identifier = fields.identifier.as_str();
            if symbols.contains_key(identifier) || rejected.contains(identifier) {
                continue;
            }
            match barcode::encode(identifier) {
                Ok(codes) => {
                    symbols.insert(identifier, codes);
                }
                Err(err) if self.skip_invalid => {
                    warn!("Label #{}: {}", index, err);
                    rejected.insert(identifier);
                }
                Err(err) => return Err(err.for_label(index)),
            }
        }

        debug!("Encoded {} distinct identifiers", symbols.len());
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelStyle;
    use crate::surface::testing::{MonoMetrics, RecordingSurface};

    fn renderer(metrics: &MonoMetrics) -> SheetRenderer<'_, MonoMetrics> {
        let composer = LabelComposer::new(LabelStyle::default(), metrics);
        SheetRenderer::new(&GridSpec::default(), composer).unwrap()
    }

    fn labels(n: usize) -> Vec<LabelFields> {
        (0..n)
            .map(|i| LabelFields {
                identifier: format!("X{:09}", i),
                ..LabelFields::default()
            })
            .collect()
    }

    #[test]
    fn test_invalid_layout_fails_before_rendering() {
        let composer = LabelComposer::new(LabelStyle::default(), &MonoMetrics);
        let spec = GridSpec {
            cols: 400,
            ..GridSpec::default()
        };
        let result = SheetRenderer::new(&spec, composer);
        assert!(matches!(result, Err(LabelError::InvalidLayout { .. })));
    }

    #[test]
    fn test_labels_split_into_pages() {
        let metrics = MonoMetrics;
        let renderer = renderer(&metrics);
        let (pages, summary) = renderer
            .render(&labels(90), |_| RecordingSurface::default())
            .unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.labels_drawn, 90);
        assert_eq!(summary.labels_skipped, 0);
        // 40 + 40 + 10 labels, 5 text runs each
        assert_eq!(pages[0].texts().len(), 40 * 5);
        assert_eq!(pages[2].texts().len(), 10 * 5);
    }

    #[test]
    fn test_fill_sheet_covers_every_cell() {
        let metrics = MonoMetrics;
        let renderer = renderer(&metrics);
        let sheet = renderer.fill_sheet(&LabelFields::default());
        assert_eq!(sheet.len(), 40);
        let (pages, summary) = renderer.render(&sheet, |_| RecordingSurface::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(summary.labels_drawn, 40);
    }

    #[test]
    fn test_unsupported_identifier_aborts_with_index() {
        let metrics = MonoMetrics;
        let renderer = renderer(&metrics);
        let mut batch = labels(5);
        batch[3].identifier = "BAD\tID".to_string();

        let mut requested = 0;
        let err = renderer
            .render(&batch, |_| {
                requested += 1;
                RecordingSurface::default()
            })
            .unwrap_err();
        assert_eq!(requested, 0);
        match err {
            LabelError::InvalidLabel { index, source } => {
                assert_eq!(index, 3);
                assert_eq!(*source, LabelError::UnsupportedCharacter { character: '\t', position: 3 });
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_skip_invalid_leaves_cell_empty() {
        let metrics = MonoMetrics;
        let renderer = renderer(&metrics).skip_invalid(true);
        let mut batch = labels(4);
        batch[1].identifier = "caf\u{00e9}".to_string();

        let (pages, summary) = renderer.render(&batch, |_| RecordingSurface::default()).unwrap();
        assert_eq!(summary.labels_drawn, 3);
        assert_eq!(summary.labels_skipped, 1);
        assert_eq!(pages[0].texts().len(), 3 * 5);
    }

    #[test]
    fn test_pages_are_independent_of_order() {
        let metrics = MonoMetrics;
        let renderer = renderer(&metrics);
        let batch = labels(3);
        let (forward, _) = renderer.render(&batch, |_| RecordingSurface::default()).unwrap();

        // Composing a single cell on its own yields the same calls as in the batch.
        let mut single = RecordingSurface::default();
        let cell = renderer.grid().cells[2];
        renderer.composer.compose(&batch[2], &cell, &mut single).unwrap();
        let tail = &forward[0].calls[forward[0].calls.len() - single.calls.len()..];
        assert_eq!(tail, single.calls.as_slice());
    }

    #[test]
    fn test_empty_batch_renders_no_pages() {
        let metrics = MonoMetrics;
        let renderer = renderer(&metrics);
        let (pages, summary) = renderer.render(&[], |_| RecordingSurface::default()).unwrap();
        assert!(pages.is_empty());
        assert_eq!(summary, RenderSummary::default());
    }
}
