//! Features Module - URL Feature Extraction Engine
//!
//! - `layout`: the 84-slot schedule shared with the trained model
//! - `vector`: versioned vector + assembler
//! - `url_parts`: the two URL decompositions
//! - `lexical`: synchronous extractor

pub mod layout;
pub mod lexical;
pub mod url_parts;
pub mod vector;


pub use layout::{
    feature_index, feature_name, layout_hash, LayoutInfo, LayoutMismatchError, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use lexical::{extract, extract_raw, RawFeatures};
pub use url_parts::{DomainParts, UrlParts};
pub use vector::{assemble, FeatureVector};
