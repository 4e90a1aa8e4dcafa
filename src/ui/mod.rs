pub mod icons;
pub mod output;

pub use icons::Icons;
pub use output::{error, header, info, listening, success, warn};
