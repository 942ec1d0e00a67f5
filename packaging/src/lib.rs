//! Renders the container image definition around the healthcheck probe: a throwaway
//! installer stage, and a final stage carrying only the probe binary together with the
//! `HEALTHCHECK` declaration the runtime enforces.

pub mod dockerfile;
pub mod errors;
pub mod recipe;

pub use dockerfile::render;
pub use recipe::ImageRecipe;
