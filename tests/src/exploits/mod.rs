//! Attack simulations. Each module drives the pipeline with a hostile
//! adapter or token and checks that nothing escapes the custody bounds.

pub mod reentrancy;
pub mod tokens;
