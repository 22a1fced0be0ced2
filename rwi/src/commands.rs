pub mod build;
pub mod debugnodes;
pub mod suggest;
