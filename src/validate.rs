//! Inbound precondition contract for apartment attributes.
//!
//! This is the boundary layer in front of the engine: the core assumes
//! every [`ApartmentFeatures`] it receives already satisfies these
//! constraints and performs no re-validation.

use crate::error::{NarxError, Result};
use crate::features::{ApartmentFeatures, CategoryCatalog};

/// City bounding box, latitude.
pub const LATITUDE_RANGE: (f32, f32) = (42.800, 42.950);
/// City bounding box, longitude.
pub const LONGITUDE_RANGE: (f32, f32) = (74.500, 74.750);

fn violation(field: &str, message: impl Into<String>) -> NarxError {
    NarxError::PreconditionViolation {
        field: field.to_string(),
        message: message.into(),
    }
}

fn check_catalog(field: &str, value: &str, allowed: &[String]) -> Result<()> {
    if allowed.iter().any(|v| v == value) {
        Ok(())
    } else {
        Err(violation(field, format!("`{value}` is not an allowed value")))
    }
}

/// Checks the full inbound contract: numeric ranges, the city bounding
/// box, floor consistency and catalog membership of every categorical
/// field. Returns the first violation found, in field order.
///
/// # Errors
///
/// Returns [`NarxError::PreconditionViolation`] naming the offending
/// field.
pub fn check_features(features: &ApartmentFeatures, catalog: &CategoryCatalog) -> Result<()> {
    if !(1..=20).contains(&features.room_count) {
        return Err(violation("room_count", "must be in 1..=20"));
    }
    if !(1.0..=1500.0).contains(&features.total_area) {
        return Err(violation("total_area", "must be in 1..=1500 m²"));
    }
    if features.floor > 40 {
        return Err(violation("floor", "must be in 0..=40"));
    }
    if !(1..=40).contains(&features.total_floors) {
        return Err(violation("total_floors", "must be in 1..=40"));
    }
    if features.floor > features.total_floors {
        return Err(violation(
            "floor",
            "cannot exceed the building's total floors",
        ));
    }
    if !(LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&features.latitude)
        || !(LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&features.longitude)
    {
        return Err(violation(
            "coordinates",
            "must lie inside the city bounding box",
        ));
    }
    check_catalog("house_series", &features.house_series, &catalog.house_series)?;
    check_catalog(
        "house_material",
        &features.house_material,
        &catalog.house_material,
    )?;
    check_catalog("heating_type", &features.heating_type, &catalog.heating_type)?;
    check_catalog("condition", &features.condition, &catalog.condition)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CategoryCatalog {
        CategoryCatalog {
            house_series: vec!["105-series".to_string()],
            house_material: vec!["panel".to_string()],
            heating_type: vec!["central".to_string()],
            condition: vec!["good".to_string()],
        }
    }

    fn valid_features() -> ApartmentFeatures {
        ApartmentFeatures {
            room_count: 2,
            total_area: 65.0,
            floor: 5,
            total_floors: 9,
            latitude: 42.8758,
            longitude: 74.6037,
            house_series: "105-series".to_string(),
            house_material: "panel".to_string(),
            heating_type: "central".to_string(),
            condition: "good".to_string(),
        }
    }

    #[test]
    fn test_valid_features_pass() {
        assert!(check_features(&valid_features(), &catalog()).is_ok());
    }

    #[test]
    fn test_room_count_bounds() {
        let mut f = valid_features();
        f.room_count = 0;
        assert!(check_features(&f, &catalog()).is_err());
        f.room_count = 21;
        assert!(check_features(&f, &catalog()).is_err());
        f.room_count = 20;
        assert!(check_features(&f, &catalog()).is_ok());
    }

    #[test]
    fn test_area_bounds() {
        let mut f = valid_features();
        f.total_area = 0.5;
        assert!(check_features(&f, &catalog()).is_err());
        f.total_area = 1500.5;
        assert!(check_features(&f, &catalog()).is_err());
    }

    #[test]
    fn test_floor_cannot_exceed_total() {
        let mut f = valid_features();
        f.floor = 10;
        f.total_floors = 9;
        let err = check_features(&f, &catalog()).unwrap_err();
        assert!(err.to_string().contains("floor"));
    }

    #[test]
    fn test_ground_floor_allowed() {
        let mut f = valid_features();
        f.floor = 0;
        assert!(check_features(&f, &catalog()).is_ok());
    }

    #[test]
    fn test_bounding_box() {
        let mut f = valid_features();
        f.latitude = 42.7;
        assert!(check_features(&f, &catalog()).is_err());
        f.latitude = 42.8758;
        f.longitude = 74.8;
        assert!(check_features(&f, &catalog()).is_err());
    }

    #[test]
    fn test_catalog_membership() {
        let mut f = valid_features();
        f.condition = "palatial".to_string();
        let err = check_features(&f, &catalog()).unwrap_err();
        assert!(err.to_string().contains("condition"));
        assert!(err.to_string().contains("palatial"));
    }
}
