use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::{NON_CONTIGUOUS_STATES, US_STATES};

#[derive(Debug, Clone, Deserialize)]
struct Boundary {
    name: String,
    #[serde(default)]
    lons: Vec<f64>,
    #[serde(default)]
    lats: Vec<f64>,
}

/// A declared map region and its outline (empty when no boundary data was loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionRate {
    pub code: String,
    pub name: String,
    pub providers: usize,
    /// `None` when no record carries this region code.
    pub rate: Option<f64>,
}

pub fn builtin_regions() -> Vec<Region> {
    US_STATES
        .iter()
        .map(|(code, name)| Region {
            code: code.to_string(),
            name: name.to_string(),
            lons: Vec::new(),
            lats: Vec::new(),
        })
        .collect()
}

/// Reads `{"CA": {"name": ..., "lons": [...], "lats": [...]}, ...}`, ordered by code.
pub fn load_boundaries(path: &Path) -> Result<Vec<Region>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed reading {}", path.display()))?;
    let boundaries: BTreeMap<String, Boundary> = serde_json::from_str(&data)
        .with_context(|| format!("Failed parsing boundary JSON {}", path.display()))?;

    let mut regions = Vec::with_capacity(boundaries.len());
    for (code, boundary) in boundaries {
        anyhow::ensure!(
            boundary.lons.len() == boundary.lats.len(),
            "Boundary for {code} has {} longitudes but {} latitudes",
            boundary.lons.len(),
            boundary.lats.len()
        );
        regions.push(Region {
            code,
            name: boundary.name,
            lons: boundary.lons,
            lats: boundary.lats,
        });
    }
    Ok(regions)
}

pub fn drop_non_contiguous(regions: Vec<Region>) -> Vec<Region> {
    regions
        .into_iter()
        .filter(|r| !NON_CONTIGUOUS_STATES.contains(&r.code.as_str()))
        .collect()
}

/// One entry per declared region, in declaration order.
pub fn join_rates(
    regions: &[Region],
    averages: &BTreeMap<String, f64>,
    providers: &BTreeMap<String, usize>,
) -> Vec<RegionRate> {
    regions
        .iter()
        .map(|region| RegionRate {
            code: region.code.clone(),
            name: region.name.clone(),
            providers: providers.get(&region.code).copied().unwrap_or(0),
            rate: averages.get(&region.code).copied(),
        })
        .collect()
}

/// Observed group values that match no declared region.
pub fn undeclared_codes(regions: &[Region], averages: &BTreeMap<String, f64>) -> Vec<String> {
    averages
        .keys()
        .filter(|code| !regions.iter().any(|r| &r.code == *code))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_regions_cover_states_and_dc() {
        let regions = builtin_regions();
        assert_eq!(regions.len(), 51);
        assert!(regions.iter().any(|r| r.code == "DC"));
        assert_eq!(drop_non_contiguous(regions).len(), 49);
    }

    #[test]
    fn join_keeps_regions_without_data() {
        let regions: Vec<Region> = builtin_regions()
            .into_iter()
            .filter(|r| ["CA", "NY", "WY"].contains(&r.code.as_str()))
            .collect();
        let averages = BTreeMap::from([("CA".to_string(), 15.0), ("NY".to_string(), 5.0)]);
        let providers = BTreeMap::from([("CA".to_string(), 2), ("NY".to_string(), 1)]);

        let joined = join_rates(&regions, &averages, &providers);
        let wy = joined.iter().find(|r| r.code == "WY").unwrap();
        assert_eq!(wy.rate, None);
        assert_eq!(wy.providers, 0);
        let ca = joined.iter().find(|r| r.code == "CA").unwrap();
        assert_eq!(ca.rate, Some(15.0));
        assert_eq!(ca.name, "California");
    }

    #[test]
    fn undeclared_codes_are_reported() {
        let regions = drop_non_contiguous(builtin_regions());
        let averages = BTreeMap::from([
            ("CA".to_string(), 1.0),
            ("GU".to_string(), 2.0),
            ("HI".to_string(), 3.0),
        ]);
        assert_eq!(undeclared_codes(&regions, &averages), vec!["GU", "HI"]);
    }

    #[test]
    fn loads_boundary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");
        std::fs::write(
            &path,
            r#"{
                "NV": {"name": "Nevada", "lons": [-120.0, -114.0, -114.0], "lats": [39.0, 36.0, 42.0]},
                "AZ": {"name": "Arizona", "lons": [], "lats": []}
            }"#,
        )
        .unwrap();
        let regions = load_boundaries(&path).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].code, "AZ");
        assert_eq!(regions[1].lats, vec![39.0, 36.0, 42.0]);
    }

    #[test]
    fn mismatched_outline_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");
        std::fs::write(&path, r#"{"NV": {"name": "Nevada", "lons": [1.0], "lats": []}}"#)
            .unwrap();
        assert!(load_boundaries(&path).is_err());
    }
}
