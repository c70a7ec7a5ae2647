pub mod grid;
pub mod mapping;
pub mod presets;
pub mod ramp;
