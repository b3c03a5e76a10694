pub mod audio_driver;
