#[allow(unused_imports)]
#[allow(dead_code)]
#[path = "./lending.types.v1.rs"]
pub mod lending;
