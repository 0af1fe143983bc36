pub mod escape;
pub mod landing;
