pub mod county;
pub mod format;
pub mod style;
pub mod view;

pub use county::{CountyProperties, FilteredCountyStats, filter_stats};
pub use format::format_number;
pub use style::{LayerDef, StyleDoc, TileDef};
pub use view::{ViewMetadata, ViewSelection, resolve_view_metadata};
