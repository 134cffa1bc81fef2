//! Synthi Analysis - measurements for verifying the kernels
//!
//! Offline tools used by the test suites, benches and the `synthi analyze`
//! command:
//!
//! - [`fft`] - Real-input FFT with analysis windows
//! - [`spectrum`] - Welch-averaged power and band energy
//! - [`distortion`] - THD measurement
//! - [`dynamics`] - Peak, RMS, DC offset, crest factor
//! - [`waveform`] - Edges, wraps and period estimation
//!
//! ## Measuring an oscillator
//!
//! ```rust
//! use synthi_analysis::{ThdAnalyzer, distortion::generate_test_tone, dynamics};
//!
//! let signal = generate_test_tone(48000.0, 440.0, 1.0, 1.0);
//! let thd = ThdAnalyzer::new(48000.0, 32768).analyze(&signal, 440.0);
//!
//! assert!(thd.thd_percent() < 1.0);
//! assert!((dynamics::peak(&signal) - 1.0).abs() < 0.01);
//! ```

pub mod distortion;
pub mod dynamics;
pub mod fft;
pub mod spectrum;
pub mod waveform;

pub use distortion::{ThdAnalyzer, ThdResult};
pub use fft::{Fft, Window};
pub use spectrum::band_energy_db;
