// Domain layer: payee ledger models and ports. No PDF/HTTP dependencies here.

pub mod model;
pub mod ports;
