pub mod clock;
pub mod contracts;
pub mod driver;
pub mod probe;
pub mod timeline;

pub use clock::*;
pub use contracts::*;
pub use driver::*;
pub use probe::*;
pub use timeline::*;
