// src/extractors/mod.rs
pub mod normalizer;
pub mod section;
pub mod span;
pub mod tables;
pub mod xref;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use section::{Marker, SectionLocator, SectionMarkers, SectionSpan, Separator};
#[allow(unused_imports)]
pub use span::{BoundaryPattern, SpanExtractor};
#[allow(unused_imports)]
pub use tables::{TableCandidate, TableCorrelator, TableOrigin};
#[allow(unused_imports)]
pub use xref::{CrossReferenceResolver, TableReference};
