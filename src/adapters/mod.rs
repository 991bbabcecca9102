// Adapters layer: concrete implementations for external systems
// (module catalog over HTTP, identifier files, CSV report rendering).

pub mod kegg;
pub mod organisms;
pub mod report;
