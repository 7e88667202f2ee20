//! Label composition: one label per grid cell, many cells per page.

mod composer;
mod fields;
mod sheet;

pub use composer::{LabelComposer, LabelReport, LabelStyle};
pub use fields::LabelFields;
pub use sheet::{RenderSummary, SheetRenderer};
