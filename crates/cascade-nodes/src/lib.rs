pub mod builtin;
pub mod factory;

pub use factory::NodeFactory;
