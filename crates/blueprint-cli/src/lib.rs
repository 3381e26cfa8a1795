pub mod bundle;
pub mod graph;
pub mod settings;
