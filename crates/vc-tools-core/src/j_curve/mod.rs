pub mod allocation;
pub mod presets;
pub mod profiles;
pub mod simulation;
