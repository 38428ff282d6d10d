//! Integration tests: real monorepos on disk, real git


mod test_changed;
mod test_discovery;
mod test_graph;
