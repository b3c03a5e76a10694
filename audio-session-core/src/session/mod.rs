pub mod capture;
pub mod context;
pub mod playback;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod mock_driver;
