mod admission;

pub use admission::Admitted;
