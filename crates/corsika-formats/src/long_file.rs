//! Companion longitudinal text files (`.long`)
//!
//! Next to a particle file the simulation may write a text file with, per
//! shower, a particle-count table, an energy-deposit table and a
//! Gaisser-Hillas fit:
//!
//! ```text
//!  LONGITUDINAL DISTRIBUTION IN   20 SLANT  STEPS OF   50. G/CM**2 FOR SHOWER      1
//!  DEPTH     GAMMAS   POSITRONS   ELECTRONS    MU+    MU-    HADRONS    CHARGED    NUCLEI   CHERENKOV
//!    50.0  1.23E+02 ...
//!  LONGITUDINAL ENERGY DEPOSIT IN   20 SLANT  STEPS OF   50. G/CM**2 FOR SHOWER      1
//!  DEPTH   GAMMA  EM IONIZ  EM CUT  MU IONIZ  MU CUT  HADR IONIZ  HADR CUT  NEUTRINO  SUM
//!    25.0  ...
//!  FIT OF THE HILLAS CURVE   N(T) = P1*((T-P2)/(P3-P2))**((P3-P2)/(P4+P5*T+P6*T**2)) * EXP((P3-T)/(P4+P5*T+P6*T**2))
//!  TO LONGITUDINAL DISTRIBUTION OF     ALL CHARGED  PARTICLES
//!  PARAMETERS         =   1.2345E+06  -1.0E+01   6.5E+02   4.5E+01  -1.0E-02   1.0E-05
//!  CHI**2/DOF         =   1.2
//! ```
//!
//! Opening the file only records where each table starts; tables are parsed
//! when a profile is requested.

use crate::error::{CorsikaError, Result};
use crate::profile::{GaisserHillasFit, LongitudinalProfile};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

const PARTICLE_HEADING: &str = "LONGITUDINAL DISTRIBUTION IN";
const DEPOSIT_HEADING: &str = "LONGITUDINAL ENERGY DEPOSIT IN";
const FIT_PARAMETERS: &str = "PARAMETERS";
const FIT_CHI2: &str = "CHI**2/DOF";

const PARTICLE_COLUMNS: usize = 10;
const DEPOSIT_COLUMNS: usize = 10;

/// Start of one table in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableStart {
    offset: u64,
    line: usize,
}

/// Parsed table heading line
#[derive(Debug, Clone, Copy, PartialEq)]
struct Heading {
    steps: usize,
    slant: bool,
    dx: f64,
}

impl Heading {
    fn parse(text: &str, line: usize) -> Result<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let invalid = |reason: &str| CorsikaError::InvalidLongFile {
            line,
            reason: reason.to_string(),
        };

        let counts = tokens_after(&tokens, "IN").ok_or_else(|| invalid("missing step count"))?;
        let steps = counts
            .first()
            .and_then(|token| token.parse::<usize>().ok())
            .ok_or_else(|| invalid("unreadable step count"))?;
        let slant = match counts.get(1) {
            Some(&"SLANT") => true,
            Some(&"VERTICAL") => false,
            _ => return Err(invalid("expected SLANT or VERTICAL")),
        };
        let dx = tokens_after(&tokens, "OF")
            .and_then(|rest| rest.first())
            .and_then(|token| parse_number(token))
            .ok_or_else(|| invalid("unreadable step width"))?;

        Ok(Self { steps, slant, dx })
    }
}

/// Lazily parsed companion longitudinal file
#[derive(Debug)]
pub struct LongFile<R = BufReader<File>> {
    reader: R,
    cos_zenith: f64,
    heading: Option<Heading>,
    particle_tables: Vec<TableStart>,
    deposit_tables: Vec<TableStart>,
}

impl LongFile {
    /// Open and scan `path`. `zenith` (rad) converts vertical depths to
    /// slant depths.
    pub fn open<P: AsRef<Path>>(path: P, zenith: f64) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening longitudinal file");
        Self::from_reader(BufReader::new(File::open(path)?), zenith)
    }
}

impl<R: BufRead + Seek> LongFile<R> {
    /// Scan an already opened reader
    pub fn from_reader(reader: R, zenith: f64) -> Result<Self> {
        let mut file = Self {
            reader,
            cos_zenith: zenith.cos(),
            heading: None,
            particle_tables: Vec::new(),
            deposit_tables: Vec::new(),
        };
        file.scan()?;
        Ok(file)
    }

    fn scan(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        let mut offset = 0u64;
        let mut line_number = 0usize;
        let mut line = String::new();

        loop {
            line.clear();
            let read = self.reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let text = line.trim();
            let start = TableStart {
                offset,
                line: line_number,
            };
            if text.starts_with(PARTICLE_HEADING) {
                if self.heading.is_none() {
                    self.heading = Some(Heading::parse(text, line_number)?);
                }
                self.particle_tables.push(start);
            } else if text.starts_with(DEPOSIT_HEADING) {
                self.deposit_tables.push(start);
            }
            offset += read as u64;
        }

        debug!(
            particle_tables = self.particle_tables.len(),
            deposit_tables = self.deposit_tables.len(),
            "scanned longitudinal file"
        );
        Ok(())
    }

    /// Number of depth steps per table
    pub fn len(&self) -> usize {
        self.heading.map_or(0, |heading| heading.steps)
    }

    /// Whether the file has no tables
    pub fn is_empty(&self) -> bool {
        self.particle_tables.is_empty() && self.deposit_tables.is_empty()
    }

    /// Number of showers with a particle table
    pub fn shower_count(&self) -> usize {
        self.particle_tables.len()
    }

    /// Step width as written in the file (g/cm²)
    pub fn dx(&self) -> f64 {
        self.heading.map_or(0.0, |heading| heading.dx)
    }

    /// Whether depths are measured along the shower axis
    pub fn is_slant_depth(&self) -> bool {
        self.heading.is_some_and(|heading| heading.slant)
    }

    /// Whether any particle-count table was found
    pub fn has_particle_profile(&self) -> bool {
        !self.particle_tables.is_empty()
    }

    /// Whether any energy-deposit table was found
    pub fn has_energy_deposit(&self) -> bool {
        !self.deposit_tables.is_empty()
    }

    /// Profile of the shower at `ordinal` (zero-based, in file order).
    ///
    /// An ordinal past the last table yields an empty profile.
    pub fn profile(&mut self, ordinal: usize) -> Result<LongitudinalProfile> {
        let mut profile = LongitudinalProfile::default();
        let conversion = if self.is_slant_depth() {
            1.0
        } else {
            1.0 / self.cos_zenith
        };

        if let Some(start) = self.particle_tables.get(ordinal).copied() {
            self.read_particle_table(start, conversion, &mut profile)?;
        } else {
            debug!(ordinal, "no particle table for shower");
        }

        if let Some(start) = self.deposit_tables.get(ordinal).copied() {
            self.read_deposit_table(start, conversion, &mut profile)?;
            profile.gaisser_hillas = self.read_fit()?;
        }
        Ok(profile)
    }

    fn read_particle_table(
        &mut self,
        start: TableStart,
        conversion: f64,
        profile: &mut LongitudinalProfile,
    ) -> Result<()> {
        let rows = self.read_table(start, PARTICLE_COLUMNS)?;
        for row in rows {
            profile.depth.push(row[0] * conversion);
            profile.gammas.push(row[1]);
            profile.electrons.push(row[2] + row[3]);
            profile.muons.push(row[4] + row[5]);
            profile.charged.push(row[7]);
        }
        Ok(())
    }

    fn read_deposit_table(
        &mut self,
        start: TableStart,
        conversion: f64,
        profile: &mut LongitudinalProfile,
    ) -> Result<()> {
        let rows = self.read_table(start, DEPOSIT_COLUMNS)?;
        let slant_dx = self.dx() * conversion;
        let mut calorimetric = 0.0;
        for row in rows {
            let deposited = row[9] - row[8];
            calorimetric += deposited;
            profile.energy_deposit_depth.push(row[0] * conversion);
            profile.energy_deposit.push(if slant_dx > 0.0 {
                deposited / slant_dx
            } else {
                0.0
            });
        }
        profile.calorimetric_energy = Some(calorimetric);
        Ok(())
    }

    /// Read the rows of the table whose heading starts at `start`.
    ///
    /// Rows end at the declared step count or the first line that is not a
    /// row of numbers, whichever comes first.
    fn read_table(&mut self, start: TableStart, columns: usize) -> Result<Vec<Vec<f64>>> {
        self.reader.seek(SeekFrom::Start(start.offset))?;
        let mut line = String::new();

        self.reader.read_line(&mut line)?;
        let steps = Heading::parse(line.trim(), start.line)?.steps;

        line.clear();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(CorsikaError::InvalidLongFile {
                line: start.line,
                reason: "table ends after its heading".to_string(),
            });
        }

        let mut line_number = start.line + 1;
        let mut rows = Vec::with_capacity(steps);
        while rows.len() < steps {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;
            let Some(row) = parse_row(&line) else {
                break;
            };
            if row.len() < columns {
                return Err(CorsikaError::InvalidLongFile {
                    line: line_number,
                    reason: format!("expected {columns} columns, found {}", row.len()),
                });
            }
            rows.push(row);
        }
        trace!(line = start.line, rows = rows.len(), "read longitudinal table");
        Ok(rows)
    }

    /// Fit block following the last table read, if any
    fn read_fit(&mut self) -> Result<Option<GaisserHillasFit>> {
        let mut line = String::new();
        let mut parameters = None;
        let mut chi2 = None;

        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            let text = line.trim();
            if text.starts_with(PARTICLE_HEADING) || text.starts_with(DEPOSIT_HEADING) {
                break;
            }
            if text.starts_with(FIT_PARAMETERS) {
                let values: Vec<f64> = values_after_equals(text);
                if let Ok(values) = <[f64; 6]>::try_from(values) {
                    parameters = Some(values);
                }
            } else if text.starts_with(FIT_CHI2) {
                chi2 = values_after_equals(text).first().copied();
            }
            if parameters.is_some() && chi2.is_some() {
                break;
            }
        }

        Ok(parameters.map(|parameters| GaisserHillasFit {
            parameters,
            chi2_per_dof: chi2.unwrap_or(0.0),
        }))
    }
}

fn tokens_after<'a>(tokens: &'a [&'a str], word: &str) -> Option<&'a [&'a str]> {
    let index = tokens.iter().position(|token| *token == word)?;
    tokens.get(index + 1..)
}

/// Parse a Fortran-formatted number such as `5.`, `1.2E+03` or `1.2D+03`
fn parse_number(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse::<f64>().ok())
}

/// All whitespace-separated numbers of a table row, or `None` for any
/// other line
fn parse_row(line: &str) -> Option<Vec<f64>> {
    let values: Option<Vec<f64>> = line.split_whitespace().map(parse_number).collect();
    values.filter(|values| !values.is_empty())
}

fn values_after_equals(text: &str) -> Vec<f64> {
    text.split_once('=')
        .map(|(_, rest)| rest.split_whitespace().filter_map(parse_number).collect())
        .unwrap_or_default()
}
