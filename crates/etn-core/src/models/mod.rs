mod link;
mod shared_image;
mod status;

pub use link::ShareableLink;
pub use shared_image::{DecodedImage, NewSharedImage, SharedImage, UploadFile};
pub use status::{truncate_chars, upload_failed_message, UploadStatus};
