// Domain layer: models, the result table and ports. No I/O happens here.

pub mod model;
pub mod ports;
pub mod table;
