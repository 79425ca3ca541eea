pub mod face;
pub mod image_store;

pub use face::{FaceVerifier, FaceVerifyError, HttpFaceVerifier};
pub use image_store::{HttpImageStore, ImageStore, ImageStoreError, StoredImage};
