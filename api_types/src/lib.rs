pub mod device;
pub mod handle;
pub mod image;
pub mod object_list;
pub mod shader;
