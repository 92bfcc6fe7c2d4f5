/*!
 * Backend Module
 * Native accelerator runtime abstraction and the shipped simulated runtime
 */

pub mod runtime;
pub mod sim;

pub use runtime::{DeviceRuntime, NativeError, NativeErrorKind, NativeResult};
pub use sim::{SimDeviceRuntime, SimRuntimeConfig};
