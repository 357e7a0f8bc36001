pub mod presets;
pub mod schedule;
pub mod sensitivity;
pub mod waterfall;
