mod link_checker;
mod link_probe;

pub use link_checker::*;
pub use link_probe::{HeadRequestProbe, LinkProbe};

#[cfg(test)]
pub(crate) use link_probe::testing;
