//! Output formats for parse trees
//!
//! - treeviz: an indented, one line per node view for reading trees in a terminal
//! - json / yaml: serde serializations for tooling

pub mod data;
pub mod registry;
pub mod treeviz;

pub use data::{JsonFormatter, YamlFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
