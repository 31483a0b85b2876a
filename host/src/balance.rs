use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Failure reading or writing the persisted balance
#[derive(Debug)]
pub enum BalanceError {
    Io(io::Error),
    /// File contents are not a decimal number
    Parse(String),
    /// Negative, NaN or infinite balance
    Invalid(f64),
}

impl fmt::Display for BalanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceError::Io(e) => write!(f, "balance storage error: {}", e),
            BalanceError::Parse(raw) => write!(f, "balance file is not a number: '{}'", raw),
            BalanceError::Invalid(v) => write!(f, "balance must be a finite, non-negative number, got {}", v),
        }
    }
}

impl std::error::Error for BalanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BalanceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BalanceError {
    fn from(e: io::Error) -> Self {
        BalanceError::Io(e)
    }
}

/// Check that a value can be stored as a balance
pub fn validate_balance(value: f64) -> Result<f64, BalanceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(BalanceError::Invalid(value))
    }
}

/// Player balance persisted as a single decimal in a text file.
///
/// Every read and write goes through one mutex, so concurrent handlers
/// cannot interleave a read-modify-write on the file.
#[derive(Debug)]
pub struct BalanceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl BalanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current balance. A missing file means nothing has been stored yet: 0.
    pub fn load(&self) -> Result<f64, BalanceError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.read_unlocked()
    }

    /// Replace the stored balance
    pub fn store(&self, value: f64) -> Result<f64, BalanceError> {
        let value = validate_balance(value)?;
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.write_unlocked(value)?;
        tracing::info!("Balance stored: {:.2}", value);
        Ok(value)
    }

    /// Add `delta` (may be negative) and return the new balance.
    /// Fails without writing if the result would drop below zero.
    pub fn adjust(&self, delta: f64) -> Result<f64, BalanceError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = self.read_unlocked()?;
        let updated = validate_balance(current + delta)?;
        self.write_unlocked(updated)?;
        tracing::debug!("Balance adjusted by {:+.2}: {:.2} -> {:.2}", delta, current, updated);
        Ok(updated)
    }

    fn read_unlocked(&self) -> Result<f64, BalanceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0.0),
            Err(e) => return Err(e.into()),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(0.0);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| BalanceError::Parse(trimmed.to_string()))?;
        validate_balance(value)
    }

    fn write_unlocked(&self, value: f64) -> Result<(), BalanceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Write beside the target and rename so readers never see a torn file
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, value.to_string())?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
