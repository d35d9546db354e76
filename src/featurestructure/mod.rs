mod node;
mod serialized;

pub use node::{Feature, Node, NodeArena, NodeDisplay, NodeIdx};
pub use serialized::SerializedNode;
