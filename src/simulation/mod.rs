pub mod states;
pub mod params;
pub mod model;
pub mod models;
pub mod trace;
pub mod frames;
pub mod clock;
pub mod announcer;
pub mod component;
pub mod engine;
pub mod scenario;
