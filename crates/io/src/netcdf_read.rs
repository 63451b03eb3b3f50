//! Low-level NetCDF extraction helpers.

use std::path::Path;

use mef_calendar::YearMonth;
use netcdf::AttributeValue;

use crate::error::IoError;
use crate::time::TimeAxis;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Name of the first alias present as a variable in `file`.
pub(crate) fn find_variable<'a>(file: &netcdf::File, aliases: &'a [&'a str]) -> Option<&'a str> {
    aliases
        .iter()
        .copied()
        .find(|&alias| file.variable(alias).is_some())
}

/// Read a 1-D `f64` variable, trying each alias in order.
///
/// Returns the data from the first alias that matches. If none match,
/// returns [`IoError::MissingVariable`] with the first alias as the name.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    for &alias in aliases {
        if let Some(var) = file.variable(alias) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }

    let name = aliases.first().copied().unwrap_or("unknown");
    Err(IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })
}

/// Packed-value decoding read from a variable's attributes.
#[derive(Debug, Clone, Copy, Default)]
struct Packing {
    fill: Option<f64>,
    missing: Option<f64>,
    scale: Option<f64>,
    offset: Option<f64>,
}

impl Packing {
    fn read(var: &netcdf::Variable<'_>) -> Self {
        Self {
            fill: numeric_attribute(var, "_FillValue"),
            missing: numeric_attribute(var, "missing_value"),
            scale: numeric_attribute(var, "scale_factor"),
            offset: numeric_attribute(var, "add_offset"),
        }
    }

    /// Fill and missing values become NaN, the rest is unpacked.
    fn decode(&self, raw: f64) -> f64 {
        if self.fill.is_some_and(|f| raw == f) || self.missing.is_some_and(|m| raw == m) {
            return f64::NAN;
        }
        raw * self.scale.unwrap_or(1.0) + self.offset.unwrap_or(0.0)
    }
}

/// Scalar numeric attribute as `f64`, or `None` if absent or non-numeric.
fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Uint(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Ushort(v) => Some(f64::from(v)),
        AttributeValue::Schar(v) => Some(f64::from(v)),
        AttributeValue::Uchar(v) => Some(f64::from(v)),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Ulonglong(v) => Some(v as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&x| f64::from(x)),
        _ => None,
    }
}

/// String attribute, or `None` if absent or not a string.
pub(crate) fn string_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// A variable read into memory with its squeezed shape.
#[derive(Debug, Clone)]
pub(crate) struct Field {
    pub(crate) data: Vec<f64>,
    pub(crate) shape: Vec<usize>,
}

/// Read an N-D `f64` variable and drop its length-1 dimensions.
///
/// A dimension named `keep` is never dropped, so a single-month file keeps its
/// time axis. `_FillValue` and `missing_value` entries become NaN and
/// `scale_factor` / `add_offset` are applied. Dropping length-1 dimensions
/// does not change the row-major data order.
pub(crate) fn read_squeezed(
    file: &netcdf::File,
    var_name: &str,
    path: &Path,
    keep: Option<&str>,
) -> Result<Field, IoError> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| IoError::MissingVariable {
            name: var_name.to_string(),
            path: path.to_path_buf(),
        })?;

    let shape: Vec<usize> = var
        .dimensions()
        .iter()
        .filter(|d| d.len() != 1 || keep.is_some_and(|k| d.name() == k))
        .map(|d| d.len())
        .collect();

    let packing = Packing::read(&var);
    let data: Vec<f64> = var
        .get_values::<f64, _>(..)?
        .into_iter()
        .map(|v| packing.decode(v))
        .collect();
    Ok(Field { data, shape })
}

/// [`read_squeezed`], requiring exactly `ndim` dimensions to remain.
pub(crate) fn read_field(
    file: &netcdf::File,
    var_name: &str,
    path: &Path,
    ndim: usize,
    keep: Option<&str>,
) -> Result<Field, IoError> {
    let field = read_squeezed(file, var_name, path, keep)?;
    if field.shape.len() != ndim {
        return Err(IoError::DimensionMismatch {
            name: format!("{var_name} dimensions"),
            expected: ndim,
            got: field.shape.len(),
        });
    }
    Ok(field)
}

/// Read a time coordinate and decode it to month labels.
///
/// The `units` attribute is required; `calendar` defaults to `standard`.
pub(crate) fn read_time(
    file: &netcdf::File,
    time_var: &str,
    path: &Path,
) -> Result<Vec<YearMonth>, IoError> {
    let var = file
        .variable(time_var)
        .ok_or_else(|| IoError::MissingVariable {
            name: time_var.to_string(),
            path: path.to_path_buf(),
        })?;

    let units = string_attribute(&var, "units").ok_or_else(|| IoError::InvalidTime {
        reason: format!("time variable '{time_var}' has no string 'units' attribute"),
    })?;
    let calendar = string_attribute(&var, "calendar");
    let axis = TimeAxis::parse(&units, calendar.as_deref())?;

    let offsets = var.get_values::<f64, _>(..)?;
    axis.decode_all(&offsets)
}

/// Name of the leading dimension of a variable, used to locate its time axis.
pub(crate) fn leading_dimension(
    file: &netcdf::File,
    var_name: &str,
    path: &Path,
) -> Result<String, IoError> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| IoError::MissingVariable {
            name: var_name.to_string(),
            path: path.to_path_buf(),
        })?;
    var.dimensions()
        .first()
        .map(|d| d.name())
        .ok_or_else(|| IoError::DimensionMismatch {
            name: format!("{var_name} dimensions"),
            expected: 3,
            got: 0,
        })
}
