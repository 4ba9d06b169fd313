use eoosmake_lib::config::Target;
use eoosmake_lib::platform::host_os;

use crate::output::print_stat;

pub fn cmd_info() {
  let host = host_os();

  println!("System:");
  match host {
    Some(os) => print_stat("Host", os.as_str()),
    None => print_stat("Host", &format!("{} (unsupported)", std::env::consts::OS)),
  }
  match Target::for_host(host) {
    Some(target) => print_stat("Default target", target.as_str()),
    None => print_stat("Default target", "none, pass --target"),
  }
  let targets: Vec<_> = Target::ALL.iter().map(Target::as_str).collect();
  print_stat("Targets", &targets.join(", "));
  print_stat("Version", env!("CARGO_PKG_VERSION"));
}
