mod batch;
mod payment;
mod student;

pub use batch::*;
pub use payment::*;
pub use student::*;
