pub mod interface;
#[cfg(test)]
pub mod memory;
pub mod s3;
