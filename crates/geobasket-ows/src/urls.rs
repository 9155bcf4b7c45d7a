//! OGC request URL builders.

/// Path segment GeoServer uses for its WFS dispatcher
pub const WFS_DISPATCHER_SEGMENT: &str = "/wfs/WfsDispatcher";

/// Path segment of the matching WCS dispatcher
pub const WCS_DISPATCHER_SEGMENT: &str = "/wcs/WcsDispatcher";

fn with_params(base: &str, params: &[(&str, &str)]) -> String {
    let mut url = base.trim_end_matches(['?', '&']).to_string();
    let mut sep = if url.contains('?') { '&' } else { '?' };
    for (key, value) in params {
        url.push(sep);
        url.push_str(key);
        url.push('=');
        url.push_str(value);
        sep = '&';
    }
    url
}

pub fn wms_capabilities_url(base: &str) -> String {
    with_params(
        base,
        &[("SERVICE", "WMS"), ("REQUEST", "GetCapabilities"), ("VERSION", "1.1.1")],
    )
}

pub fn wfs_capabilities_url(base: &str) -> String {
    with_params(
        base,
        &[("SERVICE", "WFS"), ("REQUEST", "GetCapabilities"), ("VERSION", "1.0.0")],
    )
}

pub fn describe_layer_url(base: &str, layers: &str) -> String {
    with_params(
        base,
        &[
            ("SERVICE", "WMS"),
            ("VERSION", "1.1.1"),
            ("REQUEST", "DescribeLayer"),
            ("LAYERS", layers),
        ],
    )
}

pub fn describe_feature_type_url(base: &str, type_name: &str) -> String {
    with_params(
        base,
        &[
            ("SERVICE", "WFS"),
            ("VERSION", "1.0.0"),
            ("REQUEST", "DescribeFeatureType"),
            ("TYPENAME", type_name),
        ],
    )
}

pub fn describe_coverage_url(base: &str, coverage: &str) -> String {
    with_params(
        base,
        &[
            ("SERVICE", "WCS"),
            ("VERSION", "1.0.0"),
            ("REQUEST", "DescribeCoverage"),
            ("COVERAGE", coverage),
        ],
    )
}

/// Derive the WCS endpoint matching a WFS dispatcher URL.
///
/// Substitutes the first occurrence of the WFS dispatcher path segment; a URL
/// without the segment is returned unchanged.
pub fn derive_wcs_url(wfs_url: &str) -> String {
    wfs_url.replacen(WFS_DISPATCHER_SEGMENT, WCS_DISPATCHER_SEGMENT, 1)
}
