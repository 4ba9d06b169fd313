pub const APP_NAME: &str = "eoosmake";

/// Name shown in the welcome banner and the final summary block.
pub const PROGRAM_NAME: &str = "EOOS Automotive Project Builder";

pub const BUILD_DIR_NAME: &str = "build";
pub const INSTALL_DIR_NAME: &str = "CMakeInstallDir";
pub const SCA_DIR_NAME: &str = "sca";
pub const COVERAGE_DIR_NAME: &str = "coverage";

/// Directories that must exist relative to the script directory.
pub const LOCATION_MARKERS: [&str; 3] = ["../python", "../../scripts", "../../codebase"];

pub const TEST_FILTER_SEPARATOR: &str = ":";

/// Exit status reported for any pipeline failure.
pub const FAILURE_EXIT_CODE: u8 = 1;
