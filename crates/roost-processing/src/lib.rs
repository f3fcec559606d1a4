//! Local media inspection: content sniffing, category classification and
//! per-category size validation. Nothing here touches the network.

pub mod classifier;
pub mod sniff;
pub mod validator;

pub use classifier::{classify, gif_frame_count};
pub use sniff::{sniff_file, sniff_mime};
pub use validator::SizeValidator;
