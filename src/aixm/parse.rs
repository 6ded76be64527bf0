use quick_xml::events::*;
use quick_xml::Reader;
use std::collections::HashSet;
use std::io::BufRead;

use super::*;
use crate::error::{Error, Result};
use crate::geodesy::FEET_TO_METER;

fn extract_gml_id(href: &str) -> Option<&str> {
    let s = href.split_at(href.find("@gml:id")?).1;
    let mut data = s.split('\'');
    data.next(); // Dispose of the gml:id part
    Some(data.next()?.trim())
}

fn get_attribute<B: BufRead>(reader: &Reader<B>, tag: &BytesStart, attr: &str) -> Result<Option<String>> {
    tag.attributes()
        .flat_map(|x| x)
        .find(|a| a.key == attr.as_bytes())
        .map(|a| a.unescape_and_decode_value(reader))
        .transpose()
        .map_err(|e| e.into())
}

fn get_gml_link<B: BufRead>(reader: &Reader<B>, tag: &BytesStart) -> Result<Option<String>> {
    let attr = get_attribute(reader, tag, "xlink:href")?;
    Ok(attr.and_then(|a| extract_gml_id(&a).map(|x| x.to_string())))
}

/// An elevation in meters from a value element carrying a `uom` attribute.
fn get_elevation<B: BufRead>(reader: &mut Reader<B>, buf: &mut Vec<u8>, uom: Option<String>, end: &[u8]) -> Result<Option<f64>> {
    let raw = reader.read_text(end, buf)?;
    let value = match raw.trim().parse::<f64>() {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };
    Ok(Some(match uom.as_ref().map(String::as_str) {
        Some("M") => value,
        _ => value * FEET_TO_METER,
    }))
}

fn get_unit<B: BufRead>(reader: &mut Reader<B>, buf: &mut Vec<u8>) -> Result<Unit> {
    let mut unit = UnitBuilder::default();

    loop {
        match reader.read_event(buf)? {
            Event::Start(ref event) if event.name() == b"aixm:designator" => {
                let raw = reader.read_text("aixm:designator", buf)?;
                unit.designator(raw.trim());
            }
            Event::Start(ref event) if event.name() == b"aixm:type" => {
                let raw = reader.read_text("aixm:type", buf)?;
                unit.ty(raw.trim());
            }
            Event::Empty(ref event) if event.name() == b"aixm:airportLocation" => {
                // A unit without a resolvable link fails to build and is skipped.
                if let Some(link) = get_gml_link(reader, event)? {
                    unit.airport_location(link);
                }
            }
            Event::End(ref event) if event.name() == b"aixm:Unit" => break,
            Event::Eof => return Err(quick_xml::Error::UnexpectedEof("EOF".to_owned()).into()),
            _ => (),
        }
        buf.clear();
    }

    unit.build().map_err(|_| Error::NotYielded)
}

fn get_airport<B: BufRead>(reader: &mut Reader<B>, buf: &mut Vec<u8>, start: &BytesStart) -> Result<AirportRecord> {
    let mut airport = AirportRecordBuilder::default();

    if let Some(id) = get_attribute(reader, start, "gml:id")? {
        airport.id(id);
    }

    // Nested features (city, service points) repeat some of these
    // elements; the first occurrence belongs to the airport itself.
    let mut name = None;
    let mut code = None;
    let mut pos = None;
    let mut elevation_m = None;

    loop {
        match reader.read_event(buf)? {
            Event::Start(ref event) if event.name() == b"aixm:designator" => {
                airport.designator(reader.read_text("aixm:designator", buf)?.trim());
            }
            Event::Start(ref event) if event.name() == b"aixm:locationIndicatorICAO" => {
                let raw = reader.read_text("aixm:locationIndicatorICAO", buf)?;
                if !raw.trim().is_empty() {
                    airport.icao(Some(raw.trim().to_string()));
                }
            }
            Event::Start(ref event) if event.name() == b"aixm:name" => {
                let raw = reader.read_text("aixm:name", buf)?;
                name.get_or_insert(raw.trim().to_string());
            }
            Event::Start(ref event) if event.name() == b"aixm:type" => {
                let raw = reader.read_text("aixm:type", buf)?;
                code.get_or_insert(raw.trim().to_string());
            }
            Event::Start(ref event) if event.name() == b"aixm:fieldElevation" => {
                let uom = get_attribute(reader, event, "uom")?;
                let elevation = get_elevation(reader, buf, uom, b"aixm:fieldElevation")?;
                if elevation_m.is_none() {
                    elevation_m = elevation;
                }
            }
            Event::Start(ref event) if event.name() == b"gml:pos" => {
                let raw = reader.read_text("gml:pos", buf)?;
                if pos.is_none() {
                    pos = Geod::from_aixm(&raw);
                }
            }
            Event::End(ref event) if event.name() == b"aixm:AirportHeliport" => break,
            Event::Eof => return Err(quick_xml::Error::UnexpectedEof("EOF".to_owned()).into()),
            _ => (),
        }
        buf.clear();
    }

    let name = name.unwrap_or_default();
    airport.ty(airport_type(code.as_ref().map_or("", String::as_str), &name));
    airport.name(name);
    if let Some(pos) = pos {
        airport.geod(pos.with_elevation_m(elevation_m.unwrap_or(0.0)));
    }

    airport.build().map_err(|_| Error::NotYielded)
}

/// All airports, or only those linked to one of the `filter` ARTCCs when the
/// filter is non-empty.
pub fn get_airport_info<B: BufRead, T: AsRef<str>>(aixm: &mut Reader<B>, filter: &[T]) -> Result<Vec<AirportRecord>> {
    let mut buf = Vec::new();
    let mut units = HashSet::new();
    let mut airports = Vec::new();
    loop {
        match aixm.read_event(&mut buf)? {
            Event::Start(ref event) if event.name() == b"aixm:Unit" => match get_unit(aixm, &mut Vec::new()) {
                Ok(unit) => {
                    if unit.ty == "ARTCC" && filter.iter().any(|x| x.as_ref() == unit.designator) {
                        units.insert(unit.airport_location);
                    }
                }
                Err(Error::NotYielded) => (),
                Err(x) => return Err(x),
            },
            Event::Start(ref event) if event.name() == b"aixm:AirportHeliport" => {
                match get_airport(aixm, &mut Vec::new(), event) {
                    Ok(airport) => airports.push(airport),
                    Err(Error::NotYielded) => tracing::warn!("skipping incomplete airport record"),
                    Err(x) => return Err(x),
                }
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if !filter.is_empty() {
        airports.retain(|a| units.contains(&a.id));
    }

    Ok(airports)
}

fn get_navaid<B: BufRead>(reader: &mut Reader<B>) -> Result<NavaidRecord> {
    let mut navaid = NavaidRecordBuilder::default();
    let mut name = None;
    let mut pos = None;
    let mut elevation_m = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event(&mut buf)? {
            Event::Start(ref event) if event.name() == b"aixm:designator" => {
                let raw = reader.read_text(b"aixm:designator", &mut buf)?;
                navaid.designator(raw.trim());
            }
            Event::Start(ref event) if event.name() == b"aixm:name" => {
                let raw = reader.read_text(b"aixm:name", &mut buf)?;
                name.get_or_insert(raw.trim().to_string());
            }
            Event::Start(ref event) if event.name() == b"aixm:type" => {
                let raw = reader.read_text(b"aixm:type", &mut buf)?;
                if let Some(ty) = navaid_type(raw.trim()) {
                    navaid.ty(ty);
                }
            }
            Event::Start(ref event) if event.name() == b"aixm:elevation" => {
                let uom = get_attribute(reader, event, "uom")?;
                let elevation = get_elevation(reader, &mut buf, uom, b"aixm:elevation")?;
                if elevation_m.is_none() {
                    elevation_m = elevation;
                }
            }
            Event::Start(ref event) if event.name() == b"gml:pos" => {
                let raw = reader.read_text(b"gml:pos", &mut buf)?;
                if pos.is_none() {
                    pos = Geod::from_aixm(&raw);
                }
            }
            Event::Start(ref event) if event.name() == b"nav:artccIdForLowAltitude" => {
                let raw = reader.read_text(b"nav:artccIdForLowAltitude", &mut buf)?;
                navaid.low_id(raw.trim());
            }
            Event::End(ref event) if event.name() == b"aixm:Navaid" => break,
            Event::Eof => return Err(quick_xml::Error::UnexpectedEof("EOF".to_owned()).into()),
            _ => (),
        }
        buf.clear();
    }

    navaid.name(name.unwrap_or_default());
    if let Some(pos) = pos {
        navaid.geod(pos.with_elevation_m(elevation_m.unwrap_or(0.0)));
    }

    navaid.build().map_err(|_| Error::NotYielded)
}

/// All navaids of a loadable type, or only those assigned to one of the
/// `filter` ARTCCs when the filter is non-empty.
pub fn get_navaid_info<B: BufRead, T: AsRef<str>>(aixm: &mut Reader<B>, filter: &[T]) -> Result<Vec<NavaidRecord>> {
    let mut buf = Vec::new();
    let mut navaids = Vec::new();

    loop {
        match aixm.read_event(&mut buf)? {
            Event::Start(ref event) if event.name() == b"aixm:Navaid" => match get_navaid(aixm) {
                Ok(navaid) => {
                    if filter.is_empty() || filter.iter().any(|x| x.as_ref() == navaid.low_id) {
                        navaids.push(navaid)
                    }
                }
                Err(Error::NotYielded) => (),
                Err(e) => break Err(e),
            },
            Event::Eof => break Ok(navaids),
            _ => (),
        }
        buf.clear();
    }
}
