pub mod assets;
pub mod camera;
pub mod core;
pub mod effects;
pub mod loading;
pub mod physics;
pub mod render;
pub mod scene;
pub mod signals;
pub mod systems;
