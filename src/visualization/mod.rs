pub mod coords;
pub mod scene;
pub mod renderer;
pub mod scenes;

#[cfg(feature = "viewer")]
pub mod viewer2d;
