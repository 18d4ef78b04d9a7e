pub mod delivery;
pub mod template;
