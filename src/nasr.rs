//! Catalog loader for the FAA 28-day NASR subscription archive.
//!
//! Airports come from the AIXM airport file, radio aids from the AIXM navaid
//! file and fixes from `FIX.txt`. Runways, frequencies and towers are not
//! part of these feeds and are left empty.

use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, Cursor};
use std::path::Path;

use zip::read::{ZipArchive, ZipFile};

use crate::aixm;
use crate::catalog::MemoryCatalog;
use crate::error::{Error, Result};
use crate::geo::Geod;
use crate::positioned::{AirportBuilder, NavaidBuilder, PositionedType};
use crate::txt_data::DataFile;

pub const APT_AIXM: &str = "Additional_Data/AIXM/AIXM_5.1/XML-Subscriber-Files/APT_AIXM.zip";
pub const NAV_AIXM: &str = "Additional_Data/AIXM/AIXM_5.1/XML-Subscriber-Files/NAV_AIXM.zip";
pub const FIX_TXT: &str = "FIX.txt";

const FIX1_DELIM: &[(usize, usize)] = &[
    (0, 4),   // Type
    (66, 14), // Lat
    (80, 14), // Lon
    (228, 5), // NAS ID
    (237, 4), // ARTCC ID
];

/// Loads a NASR archive from disk. An empty `artcc_ids` loads the whole
/// country.
pub fn load_archive<P: AsRef<Path>, T: AsRef<str>>(path: P, artcc_ids: &[T]) -> Result<MemoryCatalog> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    load(&mut archive, artcc_ids)
}

pub fn load<R: Read + Seek, T: AsRef<str>>(archive: &mut ZipArchive<R>, artcc_ids: &[T]) -> Result<MemoryCatalog> {
    let mut catalog = MemoryCatalog::new();

    tracing::debug!("unpacking airport AIXM");
    let apt = nested_member(archive.by_name(APT_AIXM)?)?;
    let airports = aixm::parse::get_airport_info(&mut quick_xml::Reader::from_reader(apt), artcc_ids)?;
    tracing::info!(count = airports.len(), "loaded airports");
    for a in airports {
        let airport = AirportBuilder::default()
            .ident(a.ident())
            .name(a.name)
            .ty(a.ty)
            .geod(a.geod)
            .build()
            .map_err(|_| Error::NotYielded)?;
        catalog.add_airport(airport);
    }

    tracing::debug!("unpacking navaid AIXM");
    let nav = nested_member(archive.by_name(NAV_AIXM)?)?;
    let navaids = aixm::parse::get_navaid_info(&mut quick_xml::Reader::from_reader(nav), artcc_ids)?;
    tracing::info!(count = navaids.len(), "loaded navaids");
    for n in navaids {
        let navaid = NavaidBuilder::default()
            .ident(n.designator)
            .name(n.name)
            .ty(n.ty)
            .geod(n.geod)
            .build()
            .map_err(|_| Error::NotYielded)?;
        catalog.add_navaid(navaid);
    }

    let fix = DataFile::from_reader(&mut archive.by_name(FIX_TXT)?)?;
    let mut fixes = 0;
    for r in fix.rows("FIX1", FIX1_DELIM) {
        let artcc_id = r[4];
        if !artcc_ids.is_empty() && !artcc_ids.iter().any(|x| x.as_ref() == artcc_id) {
            continue;
        }
        match Geod::from_fix_txt(r[1], r[2]) {
            Some(geod) => {
                let navaid = NavaidBuilder::default()
                    .ident(r[3])
                    .name(r[3])
                    .ty(PositionedType::Fix)
                    .geod(geod)
                    .build()
                    .map_err(|_| Error::NotYielded)?;
                catalog.add_navaid(navaid);
                fixes += 1;
            }
            None => tracing::warn!(fix = r[3], "bad lat/lon pair, ignoring"),
        }
    }
    tracing::info!(count = fixes, "loaded fixes");
    tracing::info!(summary = %catalog.summary(), "catalog ready");

    Ok(catalog)
}

/// Reads the first member of a zip archive stored inside another archive.
fn nested_member(mut zip: ZipFile) -> Result<Cursor<Vec<u8>>> {
    let mut outer = Cursor::new(Vec::with_capacity(zip.size() as usize));
    zip.read_to_end(outer.get_mut())?;

    let mut inner = ZipArchive::new(outer)?;
    let mut inner_file = inner.by_index(0)?;
    let mut contents = Cursor::new(Vec::with_capacity(inner_file.size() as usize));
    inner_file.read_to_end(contents.get_mut())?;

    Ok(contents)
}
