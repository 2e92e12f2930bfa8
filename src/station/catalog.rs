use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;
use utoipa::ToSchema;

use super::error::StationError;
use super::ground_station::GroundStation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImagerArray {
    #[strum(serialize = "REGO")]
    Rego,
    #[strum(serialize = "THEMIS")]
    Themis,
}

impl FromStr for ImagerArray {
    type Err = StationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REGO" => Ok(ImagerArray::Rego),
            "THEMIS" => Ok(ImagerArray::Themis),
            other => Err(StationError::UnsupportedArray(other.to_string())),
        }
    }
}

impl TryFrom<String> for ImagerArray {
    type Error = StationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ImagerArray> for String {
    fn from(value: ImagerArray) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationInfo {
    #[schema(value_type = String, example = "REGO")]
    pub array: ImagerArray,
    pub code: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_km: f64,
}

impl StationInfo {
    pub fn ground_station(&self) -> GroundStation {
        GroundStation::new(self.latitude_deg, self.longitude_deg, self.altitude_km)
    }
}

/// Table of known imager stations. Codes are stored upper-case and matched
/// case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<StationInfo>,
}

impl StationCatalog {
    pub fn new(stations: Vec<StationInfo>) -> Result<Self, StationError> {
        let mut catalog = Self::default();
        for station in stations {
            catalog.insert(station)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, mut station: StationInfo) -> Result<(), StationError> {
        station.code = station.code.trim().to_uppercase();
        if self.get(&station.code).is_some() {
            return Err(StationError::Duplicate(station.code));
        }
        self.stations.push(station);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<&StationInfo> {
        let code = code.trim();
        self.stations
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(code))
    }

    pub fn all(&self) -> &[StationInfo] {
        &self.stations
    }

    pub fn for_array(&self, array: ImagerArray) -> Vec<&StationInfo> {
        self.stations.iter().filter(|s| s.array == array).collect()
    }

    /// Resolves the requested codes within one array. `None` selects every
    /// station of the array.
    pub fn select(
        &self,
        array: ImagerArray,
        codes: Option<&[String]>,
    ) -> Result<Vec<&StationInfo>, StationError> {
        let Some(codes) = codes else {
            return Ok(self.for_array(array));
        };

        codes
            .iter()
            .map(|code| {
                self.get(code)
                    .filter(|s| s.array == array)
                    .ok_or_else(|| StationError::NotInArray {
                        code: code.to_uppercase(),
                        array: array.to_string(),
                    })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(array: ImagerArray, code: &str) -> StationInfo {
        StationInfo {
            array,
            code: code.to_string(),
            latitude_deg: 60.0,
            longitude_deg: -100.0,
            altitude_km: 0.0,
        }
    }

    fn catalog() -> StationCatalog {
        StationCatalog::new(vec![
            station(ImagerArray::Rego, "rank"),
            station(ImagerArray::Rego, "LUCK"),
            station(ImagerArray::Themis, "GILL"),
        ])
        .unwrap()
    }

    #[test]
    fn array_codes_are_case_insensitive() {
        assert_eq!("rego".parse::<ImagerArray>().unwrap(), ImagerArray::Rego);
        assert_eq!(" Themis ".parse::<ImagerArray>().unwrap(), ImagerArray::Themis);
        assert!("trex".parse::<ImagerArray>().is_err());
        assert_eq!(ImagerArray::Themis.to_string(), "THEMIS");
    }

    #[test]
    fn lookup_ignores_case() {
        let catalog = catalog();
        assert_eq!(catalog.get("Rank").unwrap().code, "RANK");
        assert!(catalog.get("FSMI").is_none());
    }

    #[test]
    fn rejects_duplicates() {
        let err = StationCatalog::new(vec![
            station(ImagerArray::Rego, "RANK"),
            station(ImagerArray::Themis, "rank"),
        ])
        .unwrap_err();
        assert!(matches!(err, StationError::Duplicate(code) if code == "RANK"));
    }

    #[test]
    fn select_defaults_to_whole_array() {
        let catalog = catalog();
        let rego = catalog.select(ImagerArray::Rego, None).unwrap();
        assert_eq!(rego.len(), 2);

        let codes = vec!["gill".to_string()];
        let themis = catalog.select(ImagerArray::Themis, Some(codes.as_slice())).unwrap();
        assert_eq!(themis[0].code, "GILL");

        let err = catalog.select(ImagerArray::Rego, Some(codes.as_slice())).unwrap_err();
        assert!(matches!(err, StationError::NotInArray { .. }));
    }

    #[test]
    fn station_info_deserializes_from_yaml() {
        let yaml = "array: rego\ncode: RANK\nlatitude_deg: 62.82\nlongitude_deg: -92.11\n";
        let info: StationInfo = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(info.array, ImagerArray::Rego);
        assert_eq!(info.altitude_km, 0.0);
    }
}
