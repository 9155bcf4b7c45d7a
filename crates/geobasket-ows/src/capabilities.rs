//! Capabilities document parsing.
//!
//! WMS 1.1.1 and WFS 1.0.0 GetCapabilities responses are reduced to the
//! ordered layer records the discovery engine consumes. WMS `SRS` codes and
//! bounding boxes accumulate through layer nesting as the protocol
//! prescribes; a `BoundingBox` for an SRS already seen replaces the
//! inherited one.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use crate::error::{OwsError, Result};
use crate::records::{SrsBoundingBox, WfsFeatureTypeRecord, WmsLayerRecord};

fn local_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn attr_map(element: &BytesStart) -> HashMap<String, String> {
    element
        .attributes()
        .flatten()
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect()
}

fn parse_extent(attrs: &HashMap<String, String>) -> Option<[f64; 4]> {
    let minx = attrs.get("minx")?.parse().ok()?;
    let miny = attrs.get("miny")?.parse().ok()?;
    let maxx = attrs.get("maxx")?.parse().ok()?;
    let maxy = attrs.get("maxy")?.parse().ok()?;
    Some([minx, miny, maxx, maxy])
}

#[derive(Debug, Clone, Default)]
struct LayerScope {
    name: Option<String>,
    title: Option<String>,
    srs: Vec<String>,
    bboxes: Vec<SrsBoundingBox>,
    latlon: Option<[f64; 4]>,
}

impl LayerScope {
    fn inherit(&self) -> Self {
        Self {
            name: None,
            title: None,
            srs: self.srs.clone(),
            bboxes: self.bboxes.clone(),
            latlon: self.latlon,
        }
    }

    fn add_srs(&mut self, codes: &str) {
        for code in codes.split_whitespace() {
            if !self.srs.iter().any(|existing| existing == code) {
                self.srs.push(code.to_string());
            }
        }
    }

    fn add_bbox(&mut self, bbox: SrsBoundingBox) {
        if let Some(existing) = self.bboxes.iter_mut().find(|b| b.srs == bbox.srs) {
            *existing = bbox;
        } else {
            self.bboxes.push(bbox);
        }
    }
}

/// Parse a WMS 1.1.1 GetCapabilities response into its named layer records
pub fn parse_wms_capabilities(xml: &str) -> Result<Vec<WmsLayerRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut scopes: Vec<LayerScope> = Vec::new();
    let mut root_checked = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if !root_checked {
                    if !name.ends_with("Capabilities") {
                        return Err(OwsError::Parse {
                            what: "WMS capabilities",
                            reason: format!("unexpected root element '{}'", name),
                        });
                    }
                    root_checked = true;
                }
                if name == "Layer" {
                    let scope =
                        scopes.last().map(LayerScope::inherit).unwrap_or_default();
                    scopes.push(scope);
                } else {
                    handle_wms_bbox(&name, &e, &mut scopes);
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                handle_wms_bbox(&name, &e, &mut scopes);
            }
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) => continue,
                };
                if text.trim().is_empty() {
                    continue;
                }
                let n = path.len();
                if n >= 2 && path[n - 2] == "Layer" {
                    if let Some(scope) = scopes.last_mut() {
                        match path[n - 1].as_str() {
                            "Name" => scope.name = Some(text.trim().to_string()),
                            "Title" => scope.title = Some(text.trim().to_string()),
                            "SRS" => scope.add_srs(&text),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                path.pop();
                if local_name_end(&e) == "Layer" {
                    if let Some(scope) = scopes.pop() {
                        if let Some(name) = scope.name {
                            records.push(WmsLayerRecord {
                                title: scope.title.unwrap_or_else(|| name.clone()),
                                name,
                                bbox_by_srs: scope.bboxes,
                                supported_srs: scope.srs,
                                latlon_bbox: scope.latlon,
                            });
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OwsError::Parse {
                    what: "WMS capabilities",
                    reason: e.to_string(),
                })
            }
            _ => {}
        }
    }

    if !root_checked {
        return Err(OwsError::Parse {
            what: "WMS capabilities",
            reason: "document contains no capabilities element".to_string(),
        });
    }

    Ok(records)
}

fn local_name_end(e: &quick_xml::events::BytesEnd) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn handle_wms_bbox(name: &str, e: &BytesStart, scopes: &mut [LayerScope]) {
    let Some(scope) = scopes.last_mut() else {
        return;
    };
    let attrs = attr_map(e);
    match name {
        "BoundingBox" => {
            let srs = attrs.get("SRS").or_else(|| attrs.get("CRS")).cloned();
            if let (Some(srs), Some(extent)) = (srs, parse_extent(&attrs)) {
                scope.add_bbox(SrsBoundingBox { srs, extent });
            }
        }
        "LatLonBoundingBox" => {
            if let Some(extent) = parse_extent(&attrs) {
                scope.latlon = Some(extent);
            }
        }
        _ => {}
    }
}

/// Parse a WFS 1.0.0 GetCapabilities response into its feature type records
pub fn parse_wfs_capabilities(xml: &str) -> Result<Vec<WfsFeatureTypeRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut namespaces: HashMap<String, String> = HashMap::new();
    let mut root_checked = false;

    let mut current_name: Option<String> = None;
    let mut current_title: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if !root_checked {
                    if !name.ends_with("Capabilities") {
                        return Err(OwsError::Parse {
                            what: "WFS capabilities",
                            reason: format!("unexpected root element '{}'", name),
                        });
                    }
                    // Namespace prefixes are declared on the root element
                    for (key, value) in attr_map(&e) {
                        if let Some(prefix) = key.strip_prefix("xmlns:") {
                            namespaces.insert(prefix.to_string(), value);
                        }
                    }
                    root_checked = true;
                }
                if name == "FeatureType" {
                    current_name = None;
                    current_title = None;
                }
                path.push(name);
            }
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(text) => text.trim().to_string(),
                    Err(_) => continue,
                };
                if text.is_empty() {
                    continue;
                }
                let n = path.len();
                if n >= 2 && path[n - 2] == "FeatureType" {
                    match path[n - 1].as_str() {
                        "Name" => current_name = Some(text),
                        "Title" => current_title = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                path.pop();
                if local_name_end(&e) == "FeatureType" {
                    if let Some(name) = current_name.take() {
                        let namespace = name
                            .split_once(':')
                            .and_then(|(prefix, _)| namespaces.get(prefix).cloned());
                        records.push(WfsFeatureTypeRecord {
                            title: current_title.take().unwrap_or_else(|| name.clone()),
                            name,
                            namespace,
                        });
                    }
                    current_title = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OwsError::Parse {
                    what: "WFS capabilities",
                    reason: e.to_string(),
                })
            }
            _ => {}
        }
    }

    if !root_checked {
        return Err(OwsError::Parse {
            what: "WFS capabilities",
            reason: "document contains no capabilities element".to_string(),
        });
    }

    Ok(records)
}
