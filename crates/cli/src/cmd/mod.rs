mod info;
mod make;

pub use info::cmd_info;
pub use make::{MakeArgs, cmd_make};
