pub mod arena;
pub mod color;
pub mod constants;
pub mod geometry;
pub mod grid;
pub mod player;
pub mod render;
