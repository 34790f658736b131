//! Camera Module
//!
//! Camera state and math only; window events are translated by the caller.

pub mod fly_camera;

pub use fly_camera::FlyCamera;
