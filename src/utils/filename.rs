use crate::models::ExtractRequest;
use crate::utils::constants::{OUTPUT_PREFIX, VARIABLE_SEPARATOR};
use std::path::PathBuf;

/// Shapefile name: `ACSData{year}{state}{County_Name}_{NAME__VAR1__VAR2}.shp`
pub fn shapefile_name(request: &ExtractRequest) -> String {
    format!(
        "{}{}{}{}_{}.shp",
        OUTPUT_PREFIX,
        request.year,
        request.state_abbr,
        county_component(&request.county_name),
        request.requested_columns().join(VARIABLE_SEPARATOR)
    )
}

/// Full output path inside the requested directory
pub fn shapefile_path(request: &ExtractRequest) -> PathBuf {
    request.output_dir.join(shapefile_name(request))
}

/// Spaces become underscores; path separators are replaced as well
fn county_component(county_name: &str) -> String {
    county_name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(county: &str, variables: &[&str]) -> ExtractRequest {
        ExtractRequest::new(
            "CA",
            county,
            2018,
            variables.iter().map(|s| s.to_string()).collect(),
            PathBuf::from("output"),
        )
    }

    #[test]
    fn test_shapefile_name() {
        let req = request("Los Angeles County", &["DP05_0001E", "DP03_0062E"]);

        assert_eq!(
            shapefile_name(&req),
            "ACSData2018CALos_Angeles_County_NAME__DP05_0001E__DP03_0062E.shp"
        );
    }

    #[test]
    fn test_shapefile_path_is_deterministic() {
        let a = shapefile_path(&request("Kern County", &["DP05_0001E"]));
        let b = shapefile_path(&request("Kern County", &["DP05_0001E"]));

        assert_eq!(a, b);
        assert_eq!(
            a,
            PathBuf::from("output").join("ACSData2018CAKern_County_NAME__DP05_0001E.shp")
        );
    }

    #[test]
    fn test_separators_in_county_replaced() {
        let req = request("Odd/Name County", &["DP05_0001E"]);
        assert!(!shapefile_name(&req).contains('/'));
    }
}
