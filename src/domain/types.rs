//! Shared domain types.
//!
//! Inputs (`ConjunctionRecord`, `CatalogEntry`) mirror the Space-Track JSON field
//! names they are loaded from. Outputs (`OutputRecord`) mirror the flat schema the
//! map front end consumes. Everything in between (`StateVector`,
//! `GeodeticPosition`) is plain kilometres/degrees.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use nalgebra::Vector3;
use serde::{Deserialize, Deserializer, Serialize};

/// NORAD catalog identifier.
///
/// Space-Track serves identifiers as strings in some products and numbers in
/// others. Numeric identifiers are normalized to their canonical decimal form so
/// that `"025544"`, `"25544"` and `25544` all compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim();
        match raw.parse::<u64>() {
            Ok(n) => Self(n.to_string()),
            Err(_) => Self(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let scalar = lenient::Scalar::deserialize(deserializer)?;
        Ok(ObjectId::new(scalar.into_text()))
    }
}

/// One conjunction data message summary (Space-Track `cdm_public`).
///
/// Every field is optional on the wire; the resolver decides what a missing
/// value means for a given record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConjunctionRecord {
    #[serde(rename = "CDM_ID", default, deserialize_with = "lenient::opt_text")]
    pub cdm_id: Option<String>,
    /// Time of closest approach, UTC without a zone suffix.
    #[serde(rename = "TCA", default, deserialize_with = "lenient::opt_text")]
    pub tca: Option<String>,
    /// Minimum range (km).
    #[serde(rename = "MIN_RNG", default, deserialize_with = "lenient::opt_number")]
    pub min_rng: Option<f64>,
    /// Collision probability, kept verbatim as its decimal string.
    #[serde(rename = "PC", default, deserialize_with = "lenient::opt_text")]
    pub pc: Option<String>,
    /// Identifier as sent; normalized with [`ObjectId::new`] only for lookup.
    #[serde(rename = "SAT_1_ID", default, deserialize_with = "lenient::opt_text")]
    pub sat1_id: Option<String>,
    #[serde(rename = "SAT_1_NAME", default, deserialize_with = "lenient::opt_text")]
    pub sat1_name: Option<String>,
    #[serde(rename = "SAT1_OBJECT_TYPE", default, deserialize_with = "lenient::opt_text")]
    pub sat1_type: Option<String>,
    #[serde(rename = "SAT_2_ID", default, deserialize_with = "lenient::opt_text")]
    pub sat2_id: Option<String>,
    #[serde(rename = "SAT_2_NAME", default, deserialize_with = "lenient::opt_text")]
    pub sat2_name: Option<String>,
    #[serde(rename = "SAT2_OBJECT_TYPE", default, deserialize_with = "lenient::opt_text")]
    pub sat2_type: Option<String>,
}

/// Two-line element set, stored as the raw fixed-width lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ElementSet {
    #[serde(rename = "TLE_LINE1", default)]
    pub line1: String,
    #[serde(rename = "TLE_LINE2", default)]
    pub line2: String,
}

/// One general-perturbations catalog entry (Space-Track `gp`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "NORAD_CAT_ID", default)]
    pub id: Option<ObjectId>,
    #[serde(rename = "OBJECT_NAME", default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub elements: ElementSet,
}

/// Which side of a conjunction a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    First,
    Second,
}

impl Participant {
    pub fn label(self) -> &'static str {
        match self {
            Participant::First => "rso1",
            Participant::Second => "rso2",
        }
    }
}

/// Inertial (TEME) state at an absolute epoch. Kilometres and km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub epoch: DateTime<Utc>,
}

/// Longitude/latitude in degrees, altitude in km above the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

/// One geolocated conjunction, as written to the output artifact.
///
/// Field order is the artifact's key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub position: GeodeticPosition,
    #[serde(rename = "rso1ID")]
    pub rso1_id: String,
    #[serde(rename = "rso2ID")]
    pub rso2_id: String,
    #[serde(rename = "rso1Name")]
    pub rso1_name: Option<String>,
    #[serde(rename = "rso2Name")]
    pub rso2_name: Option<String>,
    #[serde(rename = "rso1Type")]
    pub rso1_type: Option<String>,
    #[serde(rename = "rso2Type")]
    pub rso2_type: Option<String>,
    #[serde(rename = "cdmId")]
    pub cdm_id: Option<String>,
    pub pc: Option<String>,
    pub md: Option<f64>,
    pub tca: String,
}

/// When does a probability / minimum-range value count as "present"?
///
/// The gate that decides whether a record is a genuine predicted conjunction
/// keys off these two fields. `Truthy` treats empty and zero values as missing;
/// `Present` accepts any non-null value.
///
/// `Truthy` judges the minimum range by its numeric value, so the string `"0"`
/// (the form Space-Track sends) is missing too. A plain JavaScript truthiness
/// check would keep it, since any non-empty string is truthy there; use
/// `Present` for that looser behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PresenceRule {
    /// Non-empty probability string; non-zero minimum range.
    #[default]
    Truthy,
    /// Any value that is not null.
    Present,
}

impl PresenceRule {
    pub fn probability_counts(self, pc: Option<&str>) -> bool {
        match (self, pc) {
            (_, None) => false,
            (PresenceRule::Truthy, Some(s)) => !s.is_empty(),
            (PresenceRule::Present, Some(_)) => true,
        }
    }

    pub fn min_range_counts(self, md: Option<f64>) -> bool {
        match (self, md) {
            (_, None) => false,
            (PresenceRule::Truthy, Some(v)) => v != 0.0 && v.is_finite(),
            (PresenceRule::Present, Some(_)) => true,
        }
    }
}

/// Tie-break between two participants that both propagated to usable states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Participant 2 overrides participant 1 whenever both are valid.
    #[default]
    LastValidWins,
    /// Participant 1 is kept whenever both are valid.
    FirstValidWins,
}

/// Immutable run configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub cdm_path: PathBuf,
    pub gp_path: PathBuf,
    pub output_path: PathBuf,
    pub export_csv: Option<PathBuf>,
    pub presence: PresenceRule,
    pub selection: SelectionPolicy,
    pub parallel: bool,
    /// Wall-clock budget per record; overruns are reported, not enforced.
    pub record_budget: Option<Duration>,
    pub pretty: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cdm_path: PathBuf::from(DEFAULT_CDM_PATH),
            gp_path: PathBuf::from(DEFAULT_GP_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            export_csv: None,
            presence: PresenceRule::default(),
            selection: SelectionPolicy::default(),
            parallel: true,
            record_budget: None,
            pretty: false,
        }
    }
}

pub const DEFAULT_CDM_PATH: &str = "cdm_public.json";
pub const DEFAULT_GP_PATH: &str = "gp.json";
pub const DEFAULT_OUTPUT_PATH: &str = "public/cdmsWithPositions.json";

/// Field deserializers that accept either a JSON string or a JSON number.
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
    }

    impl Scalar {
        pub(super) fn into_text(self) -> String {
            match self {
                Scalar::Text(s) => s,
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
            }
        }

        /// Non-finite values (`"NaN"`, `"inf"`) are treated as unparseable.
        fn into_number(self) -> Option<f64> {
            let value = match self {
                Scalar::Text(s) => s.trim().parse::<f64>().ok(),
                Scalar::Int(i) => Some(i as f64),
                Scalar::Float(f) => Some(f),
            };
            value.filter(|v| v.is_finite())
        }
    }

    pub(super) fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(d)?.map(Scalar::into_text))
    }

    /// Unparseable text becomes `None` rather than an error.
    pub(super) fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Scalar>::deserialize(d)?.and_then(Scalar::into_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_normalizes_numeric_forms() {
        assert_eq!(ObjectId::new("025544"), ObjectId::new("25544"));
        assert_eq!(ObjectId::new(" 25544 ").as_str(), "25544");
        assert_eq!(ObjectId::new("UNKNOWN").as_str(), "UNKNOWN");

        let from_number: ObjectId = serde_json::from_str("25544").unwrap();
        let from_text: ObjectId = serde_json::from_str("\"25544\"").unwrap();
        assert_eq!(from_number, from_text);
    }

    #[test]
    fn conjunction_record_accepts_space_track_shapes() {
        let json = r#"{
            "CDM_ID": "412345678",
            "TCA": "2024-03-01T12:34:56.123000",
            "MIN_RNG": "50",
            "PC": "1.2E-03",
            "SAT_1_ID": "25544",
            "SAT_1_NAME": "ISS (ZARYA)",
            "SAT1_OBJECT_TYPE": "PAYLOAD",
            "SAT_2_ID": 48274,
            "SAT_2_NAME": "DEB",
            "SAT2_OBJECT_TYPE": "DEBRIS",
            "EMERGENCY_REPORTABLE": "Y"
        }"#;
        let rec: ConjunctionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.cdm_id.as_deref(), Some("412345678"));
        assert_eq!(rec.min_rng, Some(50.0));
        assert_eq!(rec.pc.as_deref(), Some("1.2E-03"));
        assert_eq!(rec.sat1_id.as_deref(), Some("25544"));
        assert_eq!(rec.sat2_id.as_deref(), Some("48274"));
    }

    #[test]
    fn conjunction_record_missing_and_null_fields_are_absent() {
        let rec: ConjunctionRecord = serde_json::from_str(r#"{"PC": null, "MIN_RNG": ""}"#).unwrap();
        assert_eq!(rec.pc, None);
        assert_eq!(rec.min_rng, None);
        assert_eq!(rec.sat1_id, None);
        assert_eq!(rec.tca, None);
    }

    #[test]
    fn non_finite_min_range_text_is_absent() {
        for raw in ["NaN", "inf", "-inf", "infinity"] {
            let json = format!(r#"{{"MIN_RNG": "{raw}"}}"#);
            let rec: ConjunctionRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(rec.min_rng, None, "{raw}");
        }
        let rec: ConjunctionRecord = serde_json::from_str(r#"{"MIN_RNG": " 12.5 "}"#).unwrap();
        assert_eq!(rec.min_rng, Some(12.5));
    }

    #[test]
    fn identifiers_keep_their_original_text() {
        let rec: ConjunctionRecord = serde_json::from_str(r#"{"SAT_1_ID": "025544", "SAT_2_ID": 7}"#).unwrap();
        assert_eq!(rec.sat1_id.as_deref(), Some("025544"));
        assert_eq!(rec.sat2_id.as_deref(), Some("7"));
        assert_eq!(ObjectId::new("025544"), ObjectId::new("25544"));
    }

    #[test]
    fn truthy_rule_treats_zero_range_and_empty_pc_as_missing() {
        let rule = PresenceRule::Truthy;
        assert!(!rule.min_range_counts(Some(0.0)));
        assert!(!rule.min_range_counts(None));
        assert!(rule.min_range_counts(Some(0.25)));
        assert!(!rule.min_range_counts(Some(f64::INFINITY)));
        assert!(!rule.probability_counts(Some("")));
        assert!(rule.probability_counts(Some("0")));
    }

    #[test]
    fn present_rule_accepts_zero_but_not_absent() {
        let rule = PresenceRule::Present;
        assert!(rule.min_range_counts(Some(0.0)));
        assert!(!rule.min_range_counts(None));
        assert!(rule.probability_counts(Some("")));
        assert!(!rule.probability_counts(None));
    }

    #[test]
    fn output_record_uses_front_end_keys() {
        let rec = OutputRecord {
            position: GeodeticPosition { longitude: 1.5, latitude: -2.0, altitude: 420.0 },
            rso1_id: "1".to_string(),
            rso2_id: "2".to_string(),
            rso1_name: Some("A".to_string()),
            rso2_name: None,
            rso1_type: None,
            rso2_type: None,
            cdm_id: Some("9".to_string()),
            pc: Some("1.2E-03".to_string()),
            md: Some(50.0),
            tca: "2024-03-01T12:00:00".to_string(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.starts_with(r#"{"position":{"longitude":1.5,"latitude":-2.0,"altitude":420.0},"rso1ID":"1""#));
        assert!(json.contains(r#""rso2Name":null"#));
        assert!(json.ends_with(r#""pc":"1.2E-03","md":50.0,"tca":"2024-03-01T12:00:00"}"#));
    }
}
