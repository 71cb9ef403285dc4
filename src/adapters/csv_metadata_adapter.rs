//! CSV instrument metadata adapter.
//!
//! A single instruments file with a header row and columns
//! symbol,name,sector describing the tradable universe.

use crate::domain::error::MarketstageError;
use crate::ports::metadata_port::MetadataPort;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
struct Instrument {
    name: String,
    sector: String,
}

pub struct CsvMetadataAdapter {
    // Symbol order as listed in the file; instruments keyed by symbol.
    symbols: Vec<String>,
    instruments: HashMap<String, Instrument>,
}

impl CsvMetadataAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MarketstageError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| MarketstageError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_reader(content.as_bytes())
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, MarketstageError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut symbols = Vec::new();
        let mut instruments = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| MarketstageError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let symbol = record
                .get(0)
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| MarketstageError::DataSource {
                    reason: "missing symbol column".into(),
                })?;
            let name = record.get(1).unwrap_or(&symbol).trim().to_string();
            let sector = record.get(2).unwrap_or("").trim().to_string();

            if !instruments.contains_key(&symbol) {
                symbols.push(symbol.clone());
            }
            instruments.insert(symbol, Instrument { name, sector });
        }

        Ok(Self {
            symbols,
            instruments,
        })
    }
}

impl MetadataPort for CsvMetadataAdapter {
    fn list_symbols(&self) -> Result<Vec<String>, MarketstageError> {
        Ok(self.symbols.clone())
    }

    fn sector_of(&self, symbol: &str) -> Option<String> {
        self.instruments
            .get(symbol)
            .map(|i| i.sector.clone())
            .filter(|s| !s.is_empty())
    }

    fn name_of(&self, symbol: &str) -> String {
        self.instruments
            .get(symbol)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| symbol.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "symbol,name,sector\n\
        INFY,Infosys,Information Technology\n\
        TCS,Tata Consultancy Services,Information Technology\n\
        ONGC,Oil & Natural Gas Corp,Energy\n\
        XNEW,Recently Listed Co,\n";

    #[test]
    fn lists_symbols_in_file_order() {
        let adapter = CsvMetadataAdapter::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            adapter.list_symbols().unwrap(),
            ["INFY", "TCS", "ONGC", "XNEW"]
        );
    }

    #[test]
    fn sector_lookup() {
        let adapter = CsvMetadataAdapter::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(adapter.sector_of("ONGC").unwrap(), "Energy");
        assert_eq!(adapter.sector_of("UNLISTED"), None);
        // Blank sector cells mean "no classification", not an empty sector.
        assert_eq!(adapter.sector_of("XNEW"), None);
    }

    #[test]
    fn name_falls_back_to_symbol() {
        let adapter = CsvMetadataAdapter::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(adapter.name_of("INFY"), "Infosys");
        assert_eq!(adapter.name_of("UNLISTED"), "UNLISTED");
    }

    #[test]
    fn file_adapter_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("instruments.csv");
        fs::write(&path, SAMPLE).unwrap();

        let adapter = CsvMetadataAdapter::from_file(&path).unwrap();
        assert_eq!(adapter.name_of("TCS"), "Tata Consultancy Services");
    }
}
