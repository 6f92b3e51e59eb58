pub mod defaults;
pub mod registry;
