//! Business logic services.
//!
//! Services orchestrate repositories and the remote executor and own the
//! formatting conventions, using the `FromContext` derive macro for
//! dependency injection.

mod device;
mod knowledge;

pub use device::{DeviceService, ServiceStatus, SystemInfo};
pub use knowledge::{KnowledgeService, TROUBLESHOOTING};
