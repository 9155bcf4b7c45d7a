//! WMS DescribeLayer response parsing.
//!
//! A `LayerDescription` element declares which export service serves a WMS
//! layer. Servers answer in several dialects: the export type and URL may
//! come from the `owsType`/`owsURL` attributes or from the older
//! protocol-specific `wfs`/`wcs` URL attributes; the type name to query may
//! sit on a nested `Query` element.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OwsError, Result};
use crate::records::DescribeLayerRecord;

fn attr(element: &BytesStart, name: &str) -> Option<String> {
    element.attributes().flatten().find_map(|a| {
        if a.key.as_ref() == name.as_bytes() {
            Some(String::from_utf8_lossy(&a.value).into_owned())
        } else {
            None
        }
    })
}

fn start_description(e: &BytesStart) -> DescribeLayerRecord {
    let ows_type = attr(e, "owsType").unwrap_or_else(|| {
        if attr(e, "wfs").is_some() {
            "WFS".to_string()
        } else if attr(e, "wcs").is_some() {
            "WCS".to_string()
        } else {
            String::new()
        }
    });
    let ows_url = attr(e, "owsURL")
        .or_else(|| attr(e, "wfs"))
        .or_else(|| attr(e, "wcs"))
        .unwrap_or_default();
    DescribeLayerRecord {
        ows_type,
        ows_url,
        layer_name: attr(e, "name").unwrap_or_default(),
        layer_type: attr(e, "layerType"),
    }
}

/// Parse a WMS DescribeLayer response into its layer description records
pub fn parse_describe_layer(xml: &str) -> Result<Vec<DescribeLayerRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut pending: Option<DescribeLayerRecord> = None;
    let mut root_checked = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !root_checked {
                    if !name.ends_with("DescribeLayerResponse") {
                        return Err(OwsError::Parse {
                            what: "DescribeLayer response",
                            reason: format!("unexpected root element '{}'", name),
                        });
                    }
                    root_checked = true;
                    continue;
                }
                match name.as_str() {
                    "LayerDescription" => pending = Some(start_description(&e)),
                    "Query" => {
                        if let (Some(record), Some(type_name)) =
                            (pending.as_mut(), attr(&e, "typeName"))
                        {
                            record.layer_name = type_name;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !root_checked {
                    if name.ends_with("DescribeLayerResponse") {
                        root_checked = true;
                        continue;
                    }
                    return Err(OwsError::Parse {
                        what: "DescribeLayer response",
                        reason: format!("unexpected root element '{}'", name),
                    });
                }
                match name.as_str() {
                    // self-closing description: no nested Query element
                    "LayerDescription" => records.push(start_description(&e)),
                    "Query" => {
                        if let (Some(record), Some(type_name)) =
                            (pending.as_mut(), attr(&e, "typeName"))
                        {
                            record.layer_name = type_name;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"LayerDescription" {
                    if let Some(record) = pending.take() {
                        records.push(record);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OwsError::Parse {
                    what: "DescribeLayer response",
                    reason: e.to_string(),
                })
            }
            _ => {}
        }
    }

    if !root_checked {
        return Err(OwsError::Parse {
            what: "DescribeLayer response",
            reason: "document contains no DescribeLayer response element".to_string(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wfs_description() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_DescribeLayerResponse version="1.1.1">
  <LayerDescription name="topp:states" owsType="WFS" owsURL="https://geo.example.org/wfs/WfsDispatcher">
    <Query typeName="topp:states"/>
  </LayerDescription>
</WMS_DescribeLayerResponse>"#;

        let records = parse_describe_layer(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ows_type, "WFS");
        assert_eq!(records[0].ows_url, "https://geo.example.org/wfs/WfsDispatcher");
        assert_eq!(records[0].layer_name, "topp:states");
    }

    #[test]
    fn test_parse_legacy_wfs_attribute() {
        let xml = r#"<WMS_DescribeLayerResponse version="1.1.1">
  <LayerDescription name="roads" wfs="https://geo.example.org/wfs"/>
</WMS_DescribeLayerResponse>"#;

        let records = parse_describe_layer(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ows_type, "WFS");
        assert_eq!(records[0].ows_url, "https://geo.example.org/wfs");
        assert_eq!(records[0].layer_name, "roads");
    }

    #[test]
    fn test_parse_wcs_description() {
        let xml = r#"<WMS_DescribeLayerResponse version="1.1.1">
  <LayerDescription name="elevation" owsType="WCS" owsURL="https://geo.example.org/wcs"/>
</WMS_DescribeLayerResponse>"#;

        let records = parse_describe_layer(xml).unwrap();
        assert_eq!(records[0].ows_type, "WCS");
        assert_eq!(records[0].layer_name, "elevation");
    }

    #[test]
    fn test_parse_empty_response() {
        let xml = r#"<WMS_DescribeLayerResponse version="1.1.1"/>"#;
        let records = parse_describe_layer(xml).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_url_yields_empty_string() {
        let xml = r#"<WMS_DescribeLayerResponse version="1.1.1">
  <LayerDescription name="roads" owsType="WFS"/>
</WMS_DescribeLayerResponse>"#;
        let records = parse_describe_layer(xml).unwrap();
        assert_eq!(records[0].ows_type, "WFS");
        assert!(records[0].ows_url.is_empty());
    }

    #[test]
    fn test_rejects_unexpected_document() {
        let err = parse_describe_layer("<ServiceException/>").unwrap_err();
        assert!(matches!(err, OwsError::Parse { .. }));
    }
}
