//! Host platform detection.

pub mod os;

pub use os::Os;

use crate::config::Target;

/// Returns the host operating system, or `None` if it is not supported.
pub fn host_os() -> Option<Os> {
  Os::current()
}

/// Whether `target` can be built on `host`.
///
/// Native targets need their own host family; the cross-compiled
/// FreeRTOS target builds anywhere.
pub fn host_supports(host: Option<Os>, target: Target) -> bool {
  match target {
    Target::Posix => host.is_some_and(|os| os.is_posix()),
    Target::Win32 => host == Some(Os::Windows),
    Target::FreeRtos => true,
  }
}
