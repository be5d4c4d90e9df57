pub mod capture;
pub mod conf;
pub mod core;
pub mod decode;
pub mod plan;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
