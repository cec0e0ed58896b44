//! Stock section catalog.
//!
//! Each module contributes one definition and the emitter that renders it.

use std::sync::Arc;

use crate::emitter::MarkupEmitter;
use crate::registry::SectionDefinition;

pub mod footer;
pub mod header;
pub mod hero;
pub mod image_banner;
pub mod product_grid;

/// Stock definitions paired with their emitters, in catalog order.
pub fn catalog() -> Vec<(SectionDefinition, Arc<dyn MarkupEmitter>)> {
    vec![
        paired(header::definition(), header::markup),
        paired(hero::definition(), hero::markup),
        paired(image_banner::definition(), image_banner::markup),
        paired(product_grid::definition(), product_grid::markup),
        paired(footer::definition(), footer::markup),
    ]
}

fn paired(
    definition: SectionDefinition,
    emitter: impl MarkupEmitter + 'static,
) -> (SectionDefinition, Arc<dyn MarkupEmitter>) {
    (definition, Arc::new(emitter))
}
