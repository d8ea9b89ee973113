// Domain layer: portal records, the explicit session and the ports the core talks through.

pub mod model;
pub mod ports;
pub mod session;
