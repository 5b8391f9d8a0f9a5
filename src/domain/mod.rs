// Domain layer: menu models and ports (interfaces). No HTML or storage knowledge here.

pub mod model;
pub mod ports;
