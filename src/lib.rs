// Export modules for use in tests
pub mod panic_handler;
pub mod script;
pub mod settings;
pub mod synthetic;
pub mod window;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use synthetic::{SyntheticDocument, SyntheticPage, SyntheticRasterizer};
pub use window::{Command, ViewerConfig, ViewerEvent, Window, WindowManager};
