use std::sync::Arc;

use parking_lot::Mutex;
use ::rand::{RngCore, SeedableRng, TryRngCore, rngs::OsRng, rngs::StdRng};

use crate::{Error, Result};

/// A source of random bytes.
///
/// Generators take the source as a parameter instead of reaching for a global
/// RNG, so tests can inject deterministic or failing sources.
pub trait RandSource {
    /// Fills `dest` with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntropyUnavailable`] if the source cannot deliver.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()>;

    /// Returns a random `u32`.
    ///
    /// # Errors
    ///
    /// See [`RandSource::fill_bytes`].
    fn rand_u32(&self) -> Result<u32> {
        let mut buf = [0_u8; 4];
        self.fill_bytes(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Returns a random `u64`.
    ///
    /// # Errors
    ///
    /// See [`RandSource::fill_bytes`].
    fn rand_u64(&self) -> Result<u64> {
        let mut buf = [0_u8; 8];
        self.fill_bytes(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }
}

impl<R: RandSource + ?Sized> RandSource for Arc<R> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        (**self).fill_bytes(dest)
    }
}

impl<R: RandSource + ?Sized> RandSource for &R {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        (**self).fill_bytes(dest)
    }
}

/// Draws from `rand::rng()`, the per-thread ChaCha RNG that reseeds itself
/// from the OS.
///
/// Zero-sized: it looks the generator up on every call, so one value can be
/// shared by every thread without locking.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        ::rand::rng().fill_bytes(dest);
        Ok(())
    }
}

/// A `RandSource` that reads the operating system's entropy pool on every
/// call.
///
/// Slower than [`ThreadRandom`], but read failures are reported as
/// [`Error::EntropyUnavailable`] instead of aborting.
#[derive(Default, Clone, Copy, Debug)]
pub struct OsRandom;

impl RandSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| Error::EntropyUnavailable {
                reason: e.to_string(),
            })
    }
}

/// A deterministic `RandSource` seeded from a `u64`.
///
/// Two instances with the same seed produce the same byte stream. Intended for
/// tests and reproducible demos, never for production IDs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Creates a source seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandSource for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        self.rng.lock().fill_bytes(dest);
        Ok(())
    }
}
