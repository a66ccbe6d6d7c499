pub mod bit_buffer2;
pub mod buffer2;
pub mod float_ext;
pub mod log_setup;

pub use bit_buffer2::BitBuffer2;
pub use buffer2::Buffer2;
pub use float_ext::FloatExt;

pub const EPSILON: f64 = 1e-9;
