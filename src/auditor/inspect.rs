mod dom_inspector;
mod inspection;

pub use dom_inspector::DomInspector;
pub use inspection::Inspection;
