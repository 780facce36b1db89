//! Business units served by the intake console
//!
//! A quote's `company_context` is stored as free text. Only the price book
//! endpoint insists on one of the known businesses; quote numbering maps
//! anything it does not recognize to the generic `BIZ` code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Known business units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Business {
    /// Environmental remediation
    Xes,
    /// Repairs
    Gxs,
    /// Limo services
    ExquisiteLimo,
}

impl Business {
    pub const ALL: [Business; 3] = [Business::Xes, Business::Gxs, Business::ExquisiteLimo];

    /// Canonical `company_context` value stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Business::Xes => "xes",
            Business::Gxs => "gxs",
            Business::ExquisiteLimo => "exquisite_limo",
        }
    }

    /// Three-letter code embedded in quote numbers
    pub fn code(&self) -> &'static str {
        match self {
            Business::Xes => "XES",
            Business::Gxs => "GXS",
            Business::ExquisiteLimo => "ELT",
        }
    }

    /// Limo quotes carry trip metadata instead of a job address
    pub fn is_limo(&self) -> bool {
        matches!(self, Business::ExquisiteLimo)
    }
}

impl fmt::Display for Business {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Business {
    type Err = Error;

    /// Accepts the short contexts and the long names older clients send
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xes" | "xtreme_environmental" => Ok(Business::Xes),
            "gxs" | "global_xtreme" => Ok(Business::Gxs),
            "exquisite_limo" => Ok(Business::ExquisiteLimo),
            other => Err(Error::InvalidInput(format!(
                "Invalid business '{}'. Use xes, gxs, or exquisite_limo.",
                other
            ))),
        }
    }
}

/// Quote number business code for a stored `company_context`
///
/// Matching is exact: `XES` or ` xes` are not `xes` and share the `BIZ`
/// partition with every other unknown context.
pub fn business_code(company_context: &str) -> &'static str {
    match company_context {
        "xes" | "xtreme_environmental" => Business::Xes.code(),
        "gxs" | "global_xtreme" => Business::Gxs.code(),
        "exquisite_limo" => Business::ExquisiteLimo.code(),
        _ => "BIZ",
    }
}
