//! Counter machine register file.
//!
//! Registers are conceptually infinite and zero-initialized. Only the
//! prefix that has been touched is materialized; it grows with zeros on
//! first access and never shrinks. Each register holds an unbounded
//! natural number.

use dashu::integer::UBig;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Highest register index a program may address.
pub const MAX_REGISTER: usize = 65_535;

/// The register file: an index-addressable, growable vector of counters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    values: Vec<UBig>,
}

impl RegisterFile {
    /// Create an empty register file.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create a register file holding the given initial values.
    pub fn from_values(values: Vec<u64>) -> Self {
        Self {
            values: values.into_iter().map(UBig::from).collect(),
        }
    }

    /// Create a register file from arbitrary-precision values.
    pub fn from_big(values: Vec<UBig>) -> Self {
        Self { values }
    }

    /// Number of materialized registers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no register has been materialized.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a register. Unmaterialized registers read as zero and are not
    /// grown.
    pub fn get(&self, index: usize) -> UBig {
        self.values.get(index).cloned().unwrap_or(UBig::ZERO)
    }

    /// Check if a register is zero.
    pub fn is_zero(&self, index: usize) -> bool {
        self.values.get(index).map_or(true, UBig::is_zero)
    }

    /// Make `index` addressable, zero-filling any gap.
    ///
    /// # Panics
    /// Panics if `index` exceeds [`MAX_REGISTER`]. The loader rejects such
    /// programs, so a loaded program never reaches this.
    pub fn ensure(&mut self, index: usize) {
        assert!(
            index <= MAX_REGISTER,
            "register index {} exceeds r{}",
            index,
            MAX_REGISTER
        );
        if index >= self.values.len() {
            self.values.resize(index + 1, UBig::ZERO);
        }
    }

    /// Increment a register.
    pub fn increment(&mut self, index: usize) {
        self.ensure(index);
        self.values[index] += UBig::ONE;
    }

    /// Decrement a register if it is positive.
    ///
    /// Returns `true` if the register was decremented, `false` if it was
    /// already zero.
    pub fn decrement(&mut self, index: usize) -> bool {
        self.ensure(index);
        let value = &mut self.values[index];
        if value.is_zero() {
            false
        } else {
            *value -= UBig::ONE;
            true
        }
    }

    /// The materialized values.
    pub fn as_slice(&self) -> &[UBig] {
        &self.values
    }

    /// Consume the file, returning its values.
    pub fn into_values(self) -> Vec<UBig> {
        self.values
    }
}

impl From<Vec<u64>> for RegisterFile {
    fn from(values: Vec<u64>) -> Self {
        Self::from_values(values)
    }
}

impl From<Vec<UBig>> for RegisterFile {
    fn from(values: Vec<UBig>) -> Self {
        Self::from_big(values)
    }
}

/// One register in serialized form. Values that fit in 64 bits stay plain
/// numbers; larger ones become decimal strings.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Cell {
    Small(u64),
    Large(String),
}

impl From<&UBig> for Cell {
    fn from(value: &UBig) -> Self {
        match u64::try_from(value.clone()) {
            Ok(n) => Cell::Small(n),
            Err(_) => Cell::Large(value.to_string()),
        }
    }
}

impl Serialize for RegisterFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values.iter().map(Cell::from))
    }
}

impl<'de> Deserialize<'de> for RegisterFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cells = Vec::<Cell>::deserialize(deserializer)?;
        let values = cells
            .into_iter()
            .map(|cell| match cell {
                Cell::Small(n) => Ok(UBig::from(n)),
                Cell::Large(s) => s.parse::<UBig>().map_err(D::Error::custom),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }
}

/// Tuple notation: `()`, `(0,)`, `(1, 2)`.
impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        if self.values.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegisterFile{}", self)
    }
}
