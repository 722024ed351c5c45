// Domain layer: candidate models, filter criteria and ports (interfaces).

pub mod criteria;
pub mod model;
pub mod ports;
