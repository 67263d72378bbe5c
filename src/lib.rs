//! Rotating gradient backdrop for a call screen: a fixed vertex layout,
//! a rotation that advances with time, and a draw pipeline that submits both
//! to the GPU once per frame.

pub mod backend;
pub mod blur;
pub mod buffer;
pub mod camera;
pub mod config;
pub mod error;
pub mod gradient;
pub mod pipeline;
pub mod rotation;
pub mod vertex;
