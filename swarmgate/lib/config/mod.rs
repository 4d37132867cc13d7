//! Configuration types and helpers.

mod bind_pair;
mod defaults;
mod port_mapping;
mod server;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use bind_pair::*;
pub use defaults::*;
pub use port_mapping::*;
pub use server::*;
