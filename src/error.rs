//! Error types shared by the hashing structures.

use thiserror::Error;

/// Errors reported by [`OpenAddressingTable`](crate::OpenAddressingTable) and its builder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The requested capacity was zero.
    #[error("illegal capacity: {0}")]
    IllegalCapacity(usize),

    /// The load factor was not a positive, finite number.
    #[error("illegal load factor: {0}")]
    IllegalLoadFactor(f64),

    /// A linear probing constant of zero never yields a coprime capacity.
    #[error("illegal linear probing constant: {0}")]
    IllegalProbeConstant(usize),

    /// The table was mutated after a cursor captured its modification count.
    #[error("table modified during iteration (expected modification count {expected}, found {found})")]
    ConcurrentModification { expected: u64, found: u64 },

    /// The operation is not offered by this type.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// Returns true for errors caused by bad construction parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::IllegalCapacity(_) | Error::IllegalLoadFactor(_) | Error::IllegalProbeConstant(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_grouping() {
        assert!(Error::IllegalCapacity(0).is_configuration());
        assert!(Error::IllegalLoadFactor(f64::NAN).is_configuration());
        assert!(Error::IllegalProbeConstant(0).is_configuration());
        assert!(!Error::Unsupported("remove").is_configuration());
        assert!(!Error::ConcurrentModification {
            expected: 1,
            found: 2
        }
        .is_configuration());
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::IllegalCapacity(0).to_string(), "illegal capacity: 0");
        assert_eq!(
            Error::ConcurrentModification {
                expected: 3,
                found: 4
            }
            .to_string(),
            "table modified during iteration (expected modification count 3, found 4)"
        );
    }
}
