pub mod dom_model;
pub mod escape;
pub mod html;
pub mod query;
pub mod snapshot;
pub mod tree;

pub use dom_model::{Dom, Element, NodeId};
pub use escape::css_escape;
pub use html::parse_html;
pub use snapshot::load_snapshot;
pub use tree::DocumentTree;
