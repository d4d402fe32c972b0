//! Save and load completed runs
//!
//! Layout of a save directory:
//!
//! ```text
//! <dir>/arr/{t,x,v,m,q,r}.npy   little-endian f64, C order, NumPy format 1.0
//! <dir>/metadata.dat            dt=<f64> T=<f64> GPU=<True|False> col=<True|False>
//! <dir>/log.txt                 run summary
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array, ArrayBase, ArrayD, Axis, Data, Dimension, IxDyn};

use crate::backend::BackendKind;
use crate::error::PersistenceError;
use crate::system::{ParticleSystem, RunRecord};
use crate::trajectory::Trajectory;

const NPY_MAGIC: &[u8] = b"\x93NUMPY";
const NPY_ALIGN: usize = 64;
const ARRAY_DIR: &str = "arr";
const METADATA_FILE: &str = "metadata.dat";
const LOG_FILE: &str = "log.txt";

/// Run parameters stored next to the arrays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metadata {
    pub dt: f64,
    pub total_time: f64,
    pub accelerator: bool,
    pub collision: bool,
}

impl Metadata {
    pub fn to_line(&self) -> String {
        format!(
            "dt={} T={} GPU={} col={}",
            self.dt,
            self.total_time,
            python_bool(self.accelerator),
            python_bool(self.collision)
        )
    }

    pub fn parse(line: &str) -> Result<Self, PersistenceError> {
        let fields: HashMap<&str, &str> = line
            .split_whitespace()
            .filter_map(|field| field.split_once('='))
            .collect();
        let field = |key: &str| {
            fields
                .get(key)
                .copied()
                .ok_or_else(|| PersistenceError::format(METADATA_FILE, format!("missing <{}>", key)))
        };
        let float = |key: &str| -> Result<f64, PersistenceError> {
            field(key)?.parse().map_err(|_| {
                PersistenceError::format(METADATA_FILE, format!("<{}> is not a number", key))
            })
        };
        let flag = |key: &str| -> Result<bool, PersistenceError> {
            match field(key)? {
                "True" | "true" => Ok(true),
                "False" | "false" => Ok(false),
                other => Err(PersistenceError::format(
                    METADATA_FILE,
                    format!("<{}> must be True or False, got {:?}", key, other),
                )),
            }
        };

        Ok(Self {
            dt: float("dt")?,
            total_time: float("T")?,
            accelerator: flag("GPU")?,
            collision: flag("col")?,
        })
    }
}

fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Write the system and its run under `dir`, returning the directory used
///
/// A name ending in `_` gets the first free three-digit suffix.
pub fn save(system: &ParticleSystem, dir: impl AsRef<Path>) -> Result<PathBuf, PersistenceError> {
    let run = system.run().ok_or(PersistenceError::NoRun)?;
    let summary = system.summary().ok_or(PersistenceError::NoRun)?;

    let dir = resolve_save_dir(dir.as_ref());
    let arrays = dir.join(ARRAY_DIR);
    fs::create_dir_all(&arrays)?;

    let trajectory = &run.trajectory;
    write_npy(&arrays.join("t.npy"), trajectory.t())?;
    write_npy(&arrays.join("x.npy"), trajectory.x())?;
    write_npy(&arrays.join("v.npy"), trajectory.v())?;
    write_npy(&arrays.join("m.npy"), &system.masses())?;
    write_npy(&arrays.join("q.npy"), &system.charges())?;
    write_npy(&arrays.join("r.npy"), &system.radii())?;

    let metadata = Metadata {
        dt: run.dt,
        total_time: run.total_time,
        accelerator: run.backend.is_accelerator(),
        collision: run.collision,
    };
    fs::write(dir.join(METADATA_FILE), metadata.to_line())?;
    fs::write(dir.join(LOG_FILE), summary.to_string())?;

    log::info!("Saved run to {}", dir.display());
    Ok(dir)
}

/// Rebuild a system and its run from a directory written by [`save`]
pub fn load(dir: impl AsRef<Path>) -> Result<ParticleSystem, PersistenceError> {
    let dir = dir.as_ref();
    let arrays = dir.join(ARRAY_DIR);

    let t = read_array::<ndarray::Ix1>(&arrays.join("t.npy"))?;
    let x = read_array::<ndarray::Ix3>(&arrays.join("x.npy"))?;
    let v = read_array::<ndarray::Ix3>(&arrays.join("v.npy"))?;
    let m = read_array::<ndarray::Ix1>(&arrays.join("m.npy"))?;
    let q = read_array::<ndarray::Ix1>(&arrays.join("q.npy"))?;
    let r = read_array::<ndarray::Ix1>(&arrays.join("r.npy"))?;
    let metadata = Metadata::parse(fs::read_to_string(dir.join(METADATA_FILE))?.trim())?;

    if x.len_of(Axis(0)) == 0 || v.len_of(Axis(0)) == 0 {
        return Err(PersistenceError::format("x.npy", "trajectory has no steps"));
    }

    let mut system = ParticleSystem::new(
        x.index_axis(Axis(0), 0).to_owned(),
        v.index_axis(Axis(0), 0).to_owned(),
        m,
        q,
        r,
    )?;
    let trajectory = Trajectory::from_parts(t, x, v)?;
    system.restore_run(RunRecord {
        trajectory,
        dt: metadata.dt,
        total_time: metadata.total_time,
        backend: BackendKind::from_accelerator_flag(metadata.accelerator),
        collision: metadata.collision,
    });

    Ok(system)
}

fn resolve_save_dir(dir: &Path) -> PathBuf {
    let name = dir.to_string_lossy();
    if !name.ends_with('_') {
        return dir.to_path_buf();
    }
    (0u32..)
        .map(|id| PathBuf::from(format!("{}{:03}", name, id)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dir.to_path_buf())
}

/// Header text of a NumPy 1.0 file for a little-endian f64 array
fn npy_header(shape: &[usize]) -> Vec<u8> {
    let shape = match shape {
        [n] => format!("({},)", n),
        dims => format!(
            "({})",
            dims.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
        ),
    };
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': {}, }}",
        shape
    );

    // magic + version + u16 length, padded so the data starts aligned
    let unpadded = NPY_MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (NPY_ALIGN - unpadded % NPY_ALIGN) % NPY_ALIGN;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');

    let mut bytes = Vec::with_capacity(unpadded + padding);
    bytes.extend_from_slice(NPY_MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes
}

/// Write `array` as a `.npy` file
pub fn write_npy<S, D>(path: &Path, array: &ArrayBase<S, D>) -> Result<(), PersistenceError>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let mut bytes = npy_header(array.shape());
    bytes.reserve(array.len() * 8);
    for value in array.iter() {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a little-endian f64 `.npy` file of any rank
pub fn read_npy(path: &Path) -> Result<ArrayD<f64>, PersistenceError> {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs::read(path)?;
    let malformed = |reason: &str| PersistenceError::format(file.clone(), reason);

    if bytes.len() < 10 || !bytes.starts_with(NPY_MAGIC) {
        return Err(malformed("not a NumPy file"));
    }
    let (header_len, header_start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 if bytes.len() >= 12 => (
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            12,
        ),
        _ => return Err(malformed("unsupported format version")),
    };
    let data_start = header_start + header_len;
    let header = bytes
        .get(header_start..data_start)
        .and_then(|h| std::str::from_utf8(h).ok())
        .ok_or_else(|| malformed("truncated header"))?;

    if !header.contains("'descr': '<f8'") {
        return Err(malformed("only little-endian f64 arrays are supported"));
    }
    if !header.contains("'fortran_order': False") {
        return Err(malformed("only C-ordered arrays are supported"));
    }
    let shape = parse_shape(header).ok_or_else(|| malformed("unreadable shape"))?;

    let data = &bytes[data_start..];
    let expected = shape.iter().product::<usize>() * 8;
    if data.len() != expected {
        return Err(malformed("data length does not match shape"));
    }
    let values: Vec<f64> = data
        .chunks_exact(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            f64::from_le_bytes(word)
        })
        .collect();

    Array::from_shape_vec(IxDyn(&shape), values).map_err(|e| malformed(&e.to_string()))
}

fn parse_shape(header: &str) -> Option<Vec<usize>> {
    let after = &header[header.find("'shape':")? + "'shape':".len()..];
    let open = after.find('(')?;
    let close = after.find(')')?;
    after
        .get(open + 1..close)?
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.parse().ok())
        .collect()
}

fn read_array<D: Dimension>(path: &Path) -> Result<Array<f64, D>, PersistenceError> {
    let array = read_npy(path)?;
    let found = array.ndim();
    array.into_dimensionality::<D>().map_err(|_| {
        PersistenceError::format(
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format!("expected a {}-D array, got {}-D", D::NDIM.unwrap_or(found), found),
        )
    })
}
