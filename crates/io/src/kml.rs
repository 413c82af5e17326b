// KML/KMZ placemark import

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;

use reitmap_recon::geo::Placemark;

use crate::csv::decode_text;
use crate::error::IoError;

/// Entry preferred inside a KMZ archive.
const KMZ_MAIN_ENTRY: &str = "doc.kml";

/// Read the KML markup of a `.kml` file, or of the main entry of a `.kmz` archive.
///
/// In a KMZ, `doc.kml` wins; otherwise the first `.kml` entry in archive order.
pub fn read_markup(path: &Path) -> Result<String, IoError> {
    let is_kmz = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("kmz"))
        .unwrap_or(false);

    if is_kmz {
        read_kmz_markup(path)
    } else {
        let bytes = std::fs::read(path).map_err(|e| IoError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(decode_text(bytes, path))
    }
}

fn read_kmz_markup(path: &Path) -> Result<String, IoError> {
    let path_str = path.display().to_string();
    let archive_err = |message: String| IoError::Archive {
        path: path_str.clone(),
        message,
    };

    let file = File::open(path).map_err(|e| IoError::Read {
        path: path_str.clone(),
        message: e.to_string(),
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;

    let mut chosen: Option<usize> = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| archive_err(e.to_string()))?;
        let name = entry.name().to_lowercase();
        if name == KMZ_MAIN_ENTRY {
            chosen = Some(i);
            break;
        }
        if chosen.is_none() && name.ends_with(".kml") {
            chosen = Some(i);
        }
    }

    let index = chosen.ok_or_else(|| IoError::NoMarkupEntry { path: path_str.clone() })?;
    let mut entry = archive.by_index(index).map_err(|e| archive_err(e.to_string()))?;
    log::debug!("{path_str}: reading KMZ entry '{}'", entry.name());

    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| archive_err(format!("failed to read '{}': {e}", entry.name())))?;
    Ok(decode_text(bytes, path))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Coordinates,
}

#[derive(Default)]
struct PlacemarkBuilder {
    name: Option<String>,
    coordinates: Option<String>,
}

impl PlacemarkBuilder {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Coordinates => &mut self.coordinates,
        }
    }

    fn finish(self) -> Placemark {
        Placemark {
            name: self.name.map(|n| n.trim().to_string()),
            coordinates: self.coordinates.unwrap_or_default(),
        }
    }
}

/// Extract every `Placemark` from KML markup, in document order.
///
/// Each placemark keeps the text of its first `name` and first `coordinates`
/// descendants, wherever they are nested (usually `Point/coordinates`).
/// Namespace prefixes are ignored.
pub fn parse_placemarks(markup: &str) -> Result<Vec<Placemark>, IoError> {
    let mut reader = Reader::from_str(markup);
    let mut buf = Vec::new();

    let mut placemarks = Vec::new();
    let mut current: Option<PlacemarkBuilder> = None;
    let mut capture: Option<Field> = None;

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            IoError::Markup(format!("at position {}: {e}", reader.error_position()))
        })?;
        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"Placemark" => {
                    current = Some(PlacemarkBuilder::default());
                    capture = None;
                }
                b"name" | b"coordinates" if capture.is_none() => {
                    if let Some(pm) = current.as_mut() {
                        let field = if e.local_name().as_ref() == b"name" {
                            Field::Name
                        } else {
                            Field::Coordinates
                        };
                        let slot = pm.slot(field);
                        if slot.is_none() {
                            *slot = Some(String::new());
                            capture = Some(field);
                        }
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"name" => {
                    if let Some(pm) = current.as_mut() {
                        pm.name.get_or_insert_with(String::new);
                    }
                }
                b"coordinates" => {
                    if let Some(pm) = current.as_mut() {
                        pm.coordinates.get_or_insert_with(String::new);
                    }
                }
                _ => {}
            },
            Event::Text(ref t) => {
                push_text(&mut current, capture, &String::from_utf8_lossy(t.as_ref()));
            }
            Event::CData(ref t) => {
                push_text(&mut current, capture, &String::from_utf8_lossy(t.as_ref()));
            }
            Event::GeneralRef(ref r) => {
                if capture.is_some() {
                    let resolved = match r.resolve_char_ref() {
                        Ok(Some(ch)) => ch.to_string(),
                        _ => {
                            let name = String::from_utf8_lossy(r.as_ref()).to_string();
                            match resolve_predefined_entity(&name) {
                                Some(text) => text.to_string(),
                                None => format!("&{name};"),
                            }
                        }
                    };
                    push_text(&mut current, capture, &resolved);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"Placemark" => {
                    if let Some(pm) = current.take() {
                        placemarks.push(pm.finish());
                    }
                    capture = None;
                }
                b"name" if capture == Some(Field::Name) => capture = None,
                b"coordinates" if capture == Some(Field::Coordinates) => capture = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!("parsed {} placemarks", placemarks.len());
    Ok(placemarks)
}

fn push_text(current: &mut Option<PlacemarkBuilder>, capture: Option<Field>, text: &str) {
    if let (Some(pm), Some(field)) = (current.as_mut(), capture) {
        if let Some(value) = pm.slot(field).as_mut() {
            value.push_str(text);
        }
    }
}

/// Read a KML/KMZ file and extract its placemarks.
pub fn read_placemarks(path: &Path) -> Result<Vec<Placemark>, IoError> {
    let markup = read_markup(path)?;
    parse_placemarks(&markup).map_err(|e| match e {
        IoError::Markup(message) => IoError::Markup(format!("{}: {message}", path.display())),
        other => other,
    })
}

/// Write rendered KML markup to disk.
pub fn write_markup(markup: &str, path: &Path) -> Result<(), IoError> {
    std::fs::write(path, markup).map_err(|e| IoError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
