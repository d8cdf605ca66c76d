use serde::{Deserialize, Serialize};
use std::fmt;

/// An origin–destination pair with its required flow volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    pub s: String,
    pub t: String,
    pub d: f64,
}

impl Demand {
    pub fn new(s: &str, t: &str, d: f64) -> Demand {
        Demand {
            s: s.to_string(),
            t: t.to_string(),
            d,
        }
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.s, self.t, self.d)
    }
}
