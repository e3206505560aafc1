use std::fmt;
use serde::{Deserialize, Serialize};

/// The parameters of a two level cache hierarchy, in the form the external simulator takes them
///
/// `c`, `b` and `s` are all log2 values: capacity in bytes, block size in bytes, and blocks per
/// set. `k` selects the simulator's replacement/prefetch policy.
///
/// A spec is a plain value, nothing about it is checked on construction. Use
/// [`Feasibility`](crate::feasibility::Feasibility) before handing one to the simulator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CacheSpec {
    pub c1: u32,
    pub b1: u32,
    pub s1: u32,
    pub c2: u32,
    pub b2: u32,
    pub s2: u32,
    pub k: u32,
}

/// One of the seven tunable fields of a [`CacheSpec`], in simulator flag order
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Field {
    C1,
    B1,
    S1,
    C2,
    B2,
    S2,
    K,
}

impl Field {
    pub const ALL: [Field; 7] = [Field::C1, Field::B1, Field::S1, Field::C2, Field::B2, Field::S2, Field::K];

    /// The command line flag the simulator expects for this field
    pub fn flag(self) -> &'static str {
        match self {
            Field::C1 => "-c",
            Field::B1 => "-b",
            Field::S1 => "-s",
            Field::C2 => "-C",
            Field::B2 => "-B",
            Field::S2 => "-S",
            Field::K => "-k",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Field::C1 => "C1",
            Field::B1 => "B1",
            Field::S1 => "S1",
            Field::C2 => "C2",
            Field::B2 => "B2",
            Field::S2 => "S2",
            Field::K => "K",
        }
    }
}

impl CacheSpec {
    pub const fn new(c1: u32, b1: u32, s1: u32, c2: u32, b2: u32, s2: u32, k: u32) -> Self {
        Self { c1, b1, s1, c2, b2, s2, k }
    }

    pub fn get(&self, field: Field) -> u32 {
        match field {
            Field::C1 => self.c1,
            Field::B1 => self.b1,
            Field::S1 => self.s1,
            Field::C2 => self.c2,
            Field::B2 => self.b2,
            Field::S2 => self.s2,
            Field::K => self.k,
        }
    }

    /// Returns a copy with a single field replaced
    pub fn with(mut self, field: Field, value: u32) -> Self {
        let slot = match field {
            Field::C1 => &mut self.c1,
            Field::B1 => &mut self.b1,
            Field::S1 => &mut self.s1,
            Field::C2 => &mut self.c2,
            Field::B2 => &mut self.b2,
            Field::S2 => &mut self.s2,
            Field::K => &mut self.k,
        };
        *slot = value;
        self
    }

    /// The fields in `c1,b1,s1,c2,b2,s2,k` order
    pub fn to_array(&self) -> [u32; 7] {
        Field::ALL.map(|field| self.get(field))
    }

    pub fn from_array(values: [u32; 7]) -> Self {
        let [c1, b1, s1, c2, b2, s2, k] = values;
        Self { c1, b1, s1, c2, b2, s2, k }
    }

    /// The simulator arguments for this spec, e.g. `-c 12 -b 5 -s 3 -C 15 -B 6 -S 5 -k 2`
    pub fn to_args(&self) -> Vec<String> {
        Field::ALL
            .iter()
            .flat_map(|field| [field.flag().to_string(), self.get(*field).to_string()])
            .collect()
    }

    /// Comma separated fields, as stored in a checkpoint
    pub fn to_record(&self) -> String {
        self.to_array().map(|v| v.to_string()).join(",")
    }
}

/// The simulator's own default geometry: 4KB L1 with 32 byte blocks and 8 ways, 32KB L2 with 64
/// byte blocks and 32 ways
impl Default for CacheSpec {
    fn default() -> Self {
        CacheSpec::new(12, 5, 3, 15, 6, 5, 2)
    }
}

impl fmt::Display for CacheSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in Field::ALL.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field.label(), self.get(*field))?;
        }
        Ok(())
    }
}
