use std::{borrow::Borrow, fmt, str::FromStr, sync::{Arc, LazyLock}};

use anyhow::{anyhow, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Census summary-level prefix carried by every county GEO_ID.
pub const COUNTY_GEO_ID_PREFIX: &str = "0500000US";

static FIPS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}$").unwrap());
static COUNTY_GEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0500000US(\d{2})(\d{3})$").unwrap());

/// Identifier used by the county reference dataset, e.g. "0500000US17019".
/// Keeps the original text but avoids repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoId(Arc<str>);

impl GeoId {
    pub fn new(id: impl Into<Arc<str>>) -> Self { Self(id.into()) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }

    /// The 5-digit FIPS code, if this is a well-formed county GEO_ID.
    #[inline] pub fn fips(&self) -> Option<Fips> { fips_from_geo_id(&self.0) }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Borrow<str> for GeoId {
    fn borrow(&self) -> &str { &self.0 }
}

impl From<&str> for GeoId {
    fn from(id: &str) -> Self { Self(Arc::from(id)) }
}

impl From<String> for GeoId {
    fn from(id: String) -> Self { Self(Arc::from(id)) }
}

/// A validated 5-digit county FIPS code: 2 state digits + 3 county digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fips(Arc<str>);

impl Fips {
    /// Parse `code`, returning `None` unless it is exactly five ASCII digits.
    pub fn parse(code: &str) -> Option<Self> {
        FIPS_RE.is_match(code).then(|| Self(Arc::from(code)))
    }

    /// Combine dataset `STATE` and `COUNTY` properties, left-padding the
    /// concatenation to five digits.
    pub fn from_state_county(state: &str, county: &str) -> Option<Self> {
        if state.is_empty() || county.is_empty() { return None }
        Self::parse(&format!("{:0>5}", format!("{state}{county}")))
    }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }

    /// The 2-digit state portion.
    #[inline] pub fn state(&self) -> &str { &self.0[..2] }

    /// The 3-digit county portion.
    #[inline] pub fn county(&self) -> &str { &self.0[2..] }
}

impl fmt::Display for Fips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for Fips {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| anyhow!("invalid FIPS code {s:?}: expected five digits"))
    }
}

impl TryFrom<String> for Fips {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Fips> for String {
    fn from(fips: Fips) -> Self { fips.0.to_string() }
}

/// Extract the FIPS code from a county GEO_ID. Anything that does not match
/// `0500000US` + 2 + 3 digits converts to `None`.
pub fn fips_from_geo_id(geo_id: &str) -> Option<Fips> {
    let caps = COUNTY_GEO_ID_RE.captures(geo_id)?;
    Fips::parse(&format!("{}{}", &caps[1], &caps[2]))
}

/// Build the county GEO_ID for `fips`.
pub fn geo_id_from_fips(fips: &Fips) -> GeoId {
    GeoId::from(format!("{COUNTY_GEO_ID_PREFIX}{fips}"))
}

/// The 2-digit state FIPS prefix of `fips`.
#[inline] pub fn state_fips(fips: &Fips) -> &str { fips.state() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_valid_geo_ids() {
        for raw in ["0500000US01029", "0500000US17019", "0500000US72153"] {
            let fips = fips_from_geo_id(raw).unwrap();
            assert_eq!(geo_id_from_fips(&fips).as_str(), raw);
        }
    }

    #[test]
    fn invalid_geo_ids_convert_to_none() {
        for raw in ["", "0500000US1702", "0500000US170190", "0400000US17", "0500000USabcde", "17019"] {
            assert_eq!(fips_from_geo_id(raw), None, "{raw}");
        }
    }

    #[test]
    fn fips_requires_five_digits() {
        assert!(Fips::parse("17019").is_some());
        assert!(Fips::parse("1701").is_none());
        assert!(Fips::parse("1701a").is_none());
        assert!("170190".parse::<Fips>().is_err());
    }

    #[test]
    fn fips_from_state_county_pads() {
        assert_eq!(Fips::from_state_county("01", "029").unwrap().as_str(), "01029");
        assert_eq!(Fips::from_state_county("1", "029").unwrap().as_str(), "01029");
        assert_eq!(Fips::from_state_county("", ""), None);
    }

    #[test]
    fn state_and_county_parts() {
        let fips = Fips::parse("17019").unwrap();
        assert_eq!(state_fips(&fips), "17");
        assert_eq!(fips.county(), "019");
    }

    #[test]
    fn geo_id_knows_its_fips() {
        assert_eq!(GeoId::from("0500000US17019").fips(), Fips::parse("17019"));
        assert_eq!(GeoId::from("bogus").fips(), None);
    }

    #[test]
    fn fips_serializes_as_string() {
        let fips = Fips::parse("06037").unwrap();
        let json = serde_json::to_string(&fips).unwrap();
        assert_eq!(json, "\"06037\"");
        assert!(serde_json::from_str::<Fips>("\"6037\"").is_err());
    }

    #[test]
    fn geo_id_serializes_as_plain_string() {
        let id = GeoId::from("0500000US17019");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0500000US17019\"");
        assert_eq!(serde_json::from_str::<GeoId>(&json).unwrap(), id);
    }
}
